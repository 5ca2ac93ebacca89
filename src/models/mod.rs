//! Data models for fixforge
//!
//! Contains core type definitions used throughout the application.

pub mod attribute;
pub mod config;
pub mod diagnostic;
pub mod document;
pub mod symbol;
pub mod syntax;

// Re-export commonly used types
pub use attribute::{AttributeData, AttributeDescriptor, AttributeNameStyle, WellKnownAttribute};
pub use config::FixforgeConfig;
pub use diagnostic::Diagnostic;
pub use document::{Document, DocumentId, Project, ProjectId, Solution};
pub use symbol::{Symbol, SymbolKind, SymbolLocation, SyntaxReference};
pub use syntax::{Annotation, NodeId, SyntaxElement, SyntaxNode, SyntaxToken};
