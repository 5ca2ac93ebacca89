//! Symbol model definitions
//!
//! Resolved semantic identities handed out by a [`SemanticModel`].
//!
//! [`SemanticModel`]: crate::services::semantic::SemanticModel

use std::fmt;

use serde::Serialize;

use super::document::DocumentId;
use super::syntax::{NodeId, SyntaxNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Field,
    Type,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field => write!(f, "field"),
            Self::Type => write!(f, "type"),
        }
    }
}

/// Where a symbol is declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolLocation {
    /// Declared in a document of the solution; the node can be edited
    InSource { document: DocumentId, node: NodeId },
    /// Known only through referenced metadata
    Metadata { assembly: String },
}

impl SymbolLocation {
    pub fn is_in_source(&self) -> bool {
        matches!(self, Self::InSource { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub locations: Vec<SymbolLocation>,
    /// Attribute names already applied to the declaration, as spelled in source
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    /// Declared type of a field, as spelled in source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            locations: Vec::new(),
            attributes: Vec::new(),
            type_name: None,
            container: None,
        }
    }

    pub fn with_location(mut self, location: SymbolLocation) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn has_source_location(&self) -> bool {
        self.locations.iter().any(SymbolLocation::is_in_source)
    }

    /// True when an attribute with this short or full name is applied
    pub fn has_attribute(&self, short_name: &str) -> bool {
        let long_name = format!("{short_name}Attribute");
        self.attributes.iter().any(|name| {
            let last = name.rsplit('.').next().unwrap_or(name);
            last == short_name || last == long_name
        })
    }
}

/// A declaring node together with the document it was found in
#[derive(Debug, Clone)]
pub struct SyntaxReference {
    pub document: DocumentId,
    pub node: SyntaxNode,
}
