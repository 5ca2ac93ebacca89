//! Semantic query facade
//!
//! Maps syntax nodes to declared symbols. `CSharpSemanticModel` resolves
//! types by simple name against the type declarations of a solution snapshot;
//! a type not declared in any document is reported as metadata-only.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::FixError;
use crate::infra::ast::node_types::{
    self, ATTRIBUTE, ATTRIBUTE_LIST, FIELD_DECLARATION, IDENTIFIER, VARIABLE_DECLARATION,
    VARIABLE_DECLARATOR,
};
use crate::models::attribute::{AttributeDescriptor, WellKnownAttribute};
use crate::models::document::{Document, DocumentId, Solution};
use crate::models::symbol::{Symbol, SymbolKind, SymbolLocation, SyntaxReference};
use crate::models::syntax::SyntaxNode;

/// Assembly reported for types that have no declaration in the solution
pub const METADATA_ASSEMBLY: &str = "metadata";

pub trait SemanticModel: Send + Sync {
    /// Symbol declared by `node` or by the declaration enclosing it
    fn declared_symbol(&self, node: &SyntaxNode) -> Option<Symbol>;

    /// Declared type of a field symbol
    fn field_type(&self, field: &Symbol) -> Option<Symbol>;

    /// Declaring nodes of every in-source location, in declaration order
    fn declaring_references(&self, symbol: &Symbol) -> Vec<SyntaxReference>;

    fn is_in_source(&self, location: &SymbolLocation) -> bool {
        location.is_in_source()
    }

    fn attribute_descriptor(&self, attribute: WellKnownAttribute) -> Option<AttributeDescriptor>;
}

/// Source of document trees that may need I/O to produce
#[async_trait]
pub trait DocumentHost: Send + Sync {
    async fn syntax_root(&self, document: &Document) -> Result<SyntaxNode, FixError>;
}

/// Serves trees straight from the snapshot the document belongs to
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotHost;

#[async_trait]
impl DocumentHost for SnapshotHost {
    async fn syntax_root(&self, document: &Document) -> Result<SyntaxNode, FixError> {
        tokio::task::yield_now().await;
        Ok(document.root().clone())
    }
}

#[derive(Debug, Clone)]
struct TypeDeclaration {
    document: DocumentId,
    node: SyntaxNode,
}

pub struct CSharpSemanticModel {
    solution: Solution,
    types: HashMap<String, Vec<TypeDeclaration>>,
}

impl CSharpSemanticModel {
    pub fn new(solution: &Solution) -> Self {
        let mut documents: Vec<&Document> = solution.documents().collect();
        documents.sort_by(|a, b| a.path().cmp(b.path()));

        let mut types: HashMap<String, Vec<TypeDeclaration>> = HashMap::new();
        for document in documents {
            for node in document.root().descendants() {
                if !node_types::is_type_declaration(node.kind()) {
                    continue;
                }
                if let Some(name) = declared_name(&node) {
                    types.entry(name).or_default().push(TypeDeclaration {
                        document: document.id(),
                        node,
                    });
                }
            }
        }

        tracing::debug!("Indexed {} type names", types.len());
        Self {
            solution: solution.clone(),
            types,
        }
    }

    /// Ancestors of `node` from the document root down to the node itself
    fn ancestors(&self, node: &SyntaxNode) -> Option<Vec<SyntaxNode>> {
        let document = self.solution.document_owning(node.id())?;
        document.root().path_to(node.id())
    }

    fn field_symbol(&self, field: &SyntaxNode, declarator: &SyntaxNode, path: &[SyntaxNode]) -> Option<Symbol> {
        let name = declared_name(declarator)?;
        let declaration = field.child_node(VARIABLE_DECLARATION)?;
        let type_name = declaration.children().first()?.trimmed_text();
        let document = self.solution.document_owning(field.id())?;

        let mut symbol = Symbol::new(name, SymbolKind::Field)
            .with_type_name(type_name)
            .with_attributes(attribute_names(field))
            .with_location(SymbolLocation::InSource {
                document: document.id(),
                node: declarator.id(),
            });
        if let Some(container) = path
            .iter()
            .rev()
            .find(|n| node_types::is_type_declaration(n.kind()))
            .and_then(declared_name)
        {
            symbol = symbol.with_container(container);
        }
        Some(symbol)
    }

    fn type_symbol(&self, name: &str) -> Symbol {
        let symbol = Symbol::new(name, SymbolKind::Type);
        let Some(declarations) = self.types.get(name) else {
            return symbol.with_location(SymbolLocation::Metadata {
                assembly: METADATA_ASSEMBLY.to_string(),
            });
        };

        let attributes = declarations
            .iter()
            .flat_map(|d| attribute_names(&d.node))
            .collect();
        declarations
            .iter()
            .fold(symbol.with_attributes(attributes), |symbol, d| {
                symbol.with_location(SymbolLocation::InSource {
                    document: d.document,
                    node: d.node.id(),
                })
            })
    }

    fn is_value_type(&self, name: &str) -> bool {
        self.types
            .get(name)
            .and_then(|d| d.first())
            .is_some_and(|d| node_types::is_value_type_declaration(d.node.kind()))
    }
}

impl SemanticModel for CSharpSemanticModel {
    fn declared_symbol(&self, node: &SyntaxNode) -> Option<Symbol> {
        let path = self.ancestors(node)?;

        if let Some(index) = path.iter().rposition(|n| n.kind() == FIELD_DECLARATION) {
            let field = &path[index];
            let declarator = path[index..]
                .iter()
                .find(|n| n.kind() == VARIABLE_DECLARATOR)
                .cloned()
                .or_else(|| {
                    field
                        .child_node(VARIABLE_DECLARATION)?
                        .child_node(VARIABLE_DECLARATOR)
                        .cloned()
                })?;
            return self.field_symbol(field, &declarator, &path[..index]);
        }

        if node_types::is_type_declaration(node.kind()) {
            return declared_name(node).map(|name| self.type_symbol(&name));
        }

        None
    }

    fn field_type(&self, field: &Symbol) -> Option<Symbol> {
        if field.kind != SymbolKind::Field {
            return None;
        }
        let spelled = field.type_name.as_deref()?.trim();
        let TypeName { name, array, nullable } = TypeName::parse(spelled)?;

        // arrays and Nullable<T> are constructed from metadata types
        if array || (nullable && self.is_value_type(&name)) {
            return Some(Symbol::new(spelled, SymbolKind::Type).with_location(
                SymbolLocation::Metadata {
                    assembly: METADATA_ASSEMBLY.to_string(),
                },
            ));
        }

        Some(self.type_symbol(&name))
    }

    fn declaring_references(&self, symbol: &Symbol) -> Vec<SyntaxReference> {
        symbol
            .locations
            .iter()
            .filter_map(|location| match location {
                SymbolLocation::InSource { document, node } => {
                    let node = self.solution.document(*document)?.root().find(*node)?;
                    Some(SyntaxReference {
                        document: *document,
                        node,
                    })
                }
                SymbolLocation::Metadata { .. } => None,
            })
            .collect()
    }

    fn attribute_descriptor(&self, attribute: WellKnownAttribute) -> Option<AttributeDescriptor> {
        Some(AttributeDescriptor::well_known(attribute))
    }
}

/// Name introduced by a declaration or declarator
fn declared_name(node: &SyntaxNode) -> Option<String> {
    node.child_token(IDENTIFIER).map(|t| t.text().to_string())
}

fn attribute_names(declaration: &SyntaxNode) -> Vec<String> {
    declaration
        .child_nodes()
        .filter(|n| n.kind() == ATTRIBUTE_LIST)
        .flat_map(|list| list.child_nodes().filter(|n| n.kind() == ATTRIBUTE))
        .filter_map(|attribute| attribute.children().first().map(|name| name.trimmed_text()))
        .collect()
}

/// A field type as spelled in source, reduced to the name used for lookup
#[derive(Debug, PartialEq, Eq)]
struct TypeName {
    name: String,
    array: bool,
    nullable: bool,
}

impl TypeName {
    fn parse(spelled: &str) -> Option<Self> {
        let mut text = spelled.trim();
        let mut nullable = false;
        let mut array = false;

        loop {
            if let Some(rest) = text.strip_suffix('?') {
                nullable = true;
                text = rest.trim_end();
            } else if text.ends_with(']')
                && let Some(open) = text.rfind('[')
            {
                array = true;
                text = text[..open].trim_end();
            } else {
                break;
            }
        }

        if let Some(open) = text.find('<') {
            text = text[..open].trim_end();
        }
        let text = text.rsplit("::").next().unwrap_or(text);
        let name = text.rsplit('.').next().unwrap_or(text).trim();

        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            array,
            nullable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ast::CSharpParser;
    use crate::models::document::Project;
    use std::path::Path;

    fn solution(files: &[(&str, &str)]) -> Solution {
        let parser = CSharpParser::new().unwrap();
        let mut project = Project::new("test");
        for (path, source) in files {
            let root = parser.parse(Path::new(path), source).unwrap();
            project = project.with_new_document(*path, root).0;
        }
        Solution::new().with_project(project)
    }

    fn find(solution: &Solution, kind: &str, text: &str) -> SyntaxNode {
        solution
            .documents()
            .flat_map(|d| d.root().descendants())
            .find(|n| n.kind() == kind && n.trimmed_text().contains(text))
            .unwrap()
    }

    #[test]
    fn test_type_name_parse() {
        let parsed = TypeName::parse("global::Demo.Models.Foo<int>[]?").unwrap();
        assert_eq!(parsed.name, "Foo");
        assert!(parsed.array);
        assert!(parsed.nullable);

        let parsed = TypeName::parse("object").unwrap();
        assert_eq!(parsed.name, "object");
        assert!(!parsed.array && !parsed.nullable);
    }

    #[test]
    fn test_field_symbol_and_in_source_type() {
        let solution = solution(&[
            ("Holder.cs", "[Serializable]\nclass Holder\n{\n    private Foo data;\n}\n"),
            ("Foo.cs", "class Foo\n{\n}\n"),
        ]);
        let model = CSharpSemanticModel::new(&solution);
        let declarator = find(&solution, VARIABLE_DECLARATOR, "data");

        let field = model.declared_symbol(&declarator).unwrap();
        assert_eq!(field.name, "data");
        assert_eq!(field.kind, SymbolKind::Field);
        assert_eq!(field.type_name.as_deref(), Some("Foo"));
        assert_eq!(field.container.as_deref(), Some("Holder"));

        let ty = model.field_type(&field).unwrap();
        assert!(ty.has_source_location());
        let references = model.declaring_references(&ty);
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].node.kind(), "class_declaration");
        let foo_doc = solution.document_by_path(Path::new("Foo.cs")).unwrap();
        assert_eq!(references[0].document, foo_doc.id());
    }

    #[test]
    fn test_external_type_is_metadata_only() {
        let solution = solution(&[(
            "Holder.cs",
            "class Holder\n{\n    private System.IO.Stream stream;\n    private object data;\n}\n",
        )]);
        let model = CSharpSemanticModel::new(&solution);

        for name in ["stream", "data"] {
            let declarator = find(&solution, VARIABLE_DECLARATOR, name);
            let field = model.declared_symbol(&declarator).unwrap();
            let ty = model.field_type(&field).unwrap();
            assert!(!ty.has_source_location(), "{name} type should be external");
            assert!(model.declaring_references(&ty).is_empty());
        }
    }

    #[test]
    fn test_partial_type_lists_all_declarations_in_path_order() {
        let solution = solution(&[
            ("B.cs", "partial class Foo { int b; }\n"),
            ("A.cs", "partial class Foo { int a; }\nclass Holder { Foo foo; }\n"),
        ]);
        let model = CSharpSemanticModel::new(&solution);
        let declarator = find(&solution, VARIABLE_DECLARATOR, "foo");
        let field = model.declared_symbol(&declarator).unwrap();
        let ty = model.field_type(&field).unwrap();

        let references = model.declaring_references(&ty);
        assert_eq!(references.len(), 2);
        let first = solution.document(references[0].document).unwrap();
        assert_eq!(first.path(), Path::new("A.cs"));
    }

    #[test]
    fn test_arrays_and_nullable_structs_are_not_in_source() {
        let solution = solution(&[(
            "Holder.cs",
            "struct Point { int x; }\nclass Foo { }\nclass Holder { Foo[] many; Point? maybe; Foo? nullableRef; }\n",
        )]);
        let model = CSharpSemanticModel::new(&solution);

        let symbol_for = |name: &str| {
            let declarator = find(&solution, VARIABLE_DECLARATOR, name);
            let field = model.declared_symbol(&declarator).unwrap();
            model.field_type(&field).unwrap()
        };

        assert!(!symbol_for("many").has_source_location());
        assert!(!symbol_for("maybe").has_source_location());
        assert!(symbol_for("nullableRef").has_source_location());
    }

    #[tokio::test]
    async fn test_snapshot_host_returns_current_root() {
        let solution = solution(&[("Foo.cs", "class Foo { }\n")]);
        let document = solution.documents().next().unwrap();
        let root = SnapshotHost.syntax_root(document).await.unwrap();
        assert!(root.ptr_eq(document.root()));
    }

    #[test]
    fn test_declared_symbol_outside_field() {
        let solution = solution(&[("Foo.cs", "[Obsolete] class Foo { void Run() { } }\n")]);
        let model = CSharpSemanticModel::new(&solution);

        let class = find(&solution, "class_declaration", "Foo");
        let symbol = model.declared_symbol(&class).unwrap();
        assert_eq!(symbol.kind, SymbolKind::Type);
        assert!(symbol.has_attribute("Obsolete"));

        let method = find(&solution, "method_declaration", "Run");
        assert!(model.declared_symbol(&method).is_none());
    }
}
