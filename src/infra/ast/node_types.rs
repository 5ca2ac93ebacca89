//! Tree-sitter Node Type Mappings
//!
//! C# node kinds used by the fixers, from
//! `tree-sitter-c-sharp/src/node-types.json`.

pub const COMPILATION_UNIT: &str = "compilation_unit";
pub const USING_DIRECTIVE: &str = "using_directive";
pub const NAMESPACE_DECLARATION: &str = "namespace_declaration";
pub const FILE_SCOPED_NAMESPACE_DECLARATION: &str = "file_scoped_namespace_declaration";

pub const CLASS_DECLARATION: &str = "class_declaration";
pub const STRUCT_DECLARATION: &str = "struct_declaration";
pub const RECORD_DECLARATION: &str = "record_declaration";
pub const RECORD_STRUCT_DECLARATION: &str = "record_struct_declaration";
pub const INTERFACE_DECLARATION: &str = "interface_declaration";
pub const ENUM_DECLARATION: &str = "enum_declaration";
pub const DELEGATE_DECLARATION: &str = "delegate_declaration";

pub const FIELD_DECLARATION: &str = "field_declaration";
pub const EVENT_FIELD_DECLARATION: &str = "event_field_declaration";
pub const PROPERTY_DECLARATION: &str = "property_declaration";
pub const METHOD_DECLARATION: &str = "method_declaration";
pub const VARIABLE_DECLARATION: &str = "variable_declaration";
pub const VARIABLE_DECLARATOR: &str = "variable_declarator";

pub const ATTRIBUTE_LIST: &str = "attribute_list";
pub const ATTRIBUTE: &str = "attribute";
pub const QUALIFIED_NAME: &str = "qualified_name";
pub const IDENTIFIER: &str = "identifier";

/// Declarations that introduce a named type
const TYPE_DECLARATIONS: &[&str] = &[
    CLASS_DECLARATION,
    STRUCT_DECLARATION,
    RECORD_DECLARATION,
    RECORD_STRUCT_DECLARATION,
    INTERFACE_DECLARATION,
    ENUM_DECLARATION,
];

/// Value types: `T?` on these is `Nullable<T>`, not an annotation
const VALUE_TYPE_DECLARATIONS: &[&str] = &[
    STRUCT_DECLARATION,
    RECORD_STRUCT_DECLARATION,
    ENUM_DECLARATION,
];

/// Declarations whose grammar rule starts with `repeat($.attribute_list)`
const ATTRIBUTABLE_DECLARATIONS: &[&str] = &[
    CLASS_DECLARATION,
    STRUCT_DECLARATION,
    RECORD_DECLARATION,
    RECORD_STRUCT_DECLARATION,
    INTERFACE_DECLARATION,
    ENUM_DECLARATION,
    DELEGATE_DECLARATION,
    FIELD_DECLARATION,
    EVENT_FIELD_DECLARATION,
    PROPERTY_DECLARATION,
    METHOD_DECLARATION,
];

pub fn is_type_declaration(kind: &str) -> bool {
    TYPE_DECLARATIONS.contains(&kind)
}

pub fn is_value_type_declaration(kind: &str) -> bool {
    VALUE_TYPE_DECLARATIONS.contains(&kind)
}

pub fn is_attributable(kind: &str) -> bool {
    ATTRIBUTABLE_DECLARATIONS.contains(&kind)
}
