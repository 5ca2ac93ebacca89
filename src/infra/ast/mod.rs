//! AST parsing infrastructure for fixforge
//!
//! Tree-sitter based parsing of C# sources into the immutable syntax model.

pub mod csharp;
pub mod node_types;

pub use csharp::CSharpParser;
