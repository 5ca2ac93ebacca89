//! C# parsing
//!
//! Parses with tree-sitter and lowers the concrete tree into the immutable
//! syntax model. Leaf nodes become tokens; the source between two leaves
//! becomes the leading trivia of the second one, so lowering is lossless.

use std::path::Path;
use std::sync::Mutex;

use tree_sitter::{Language, Node, Parser};

use crate::error::WorkspaceError;
use crate::models::syntax::{END_OF_FILE, SyntaxElement, SyntaxNode, SyntaxToken};

pub struct CSharpParser {
    parser: Mutex<Parser>,
}

impl CSharpParser {
    pub fn new() -> Result<Self, WorkspaceError> {
        Ok(Self {
            parser: Mutex::new(Self::create_parser(tree_sitter_c_sharp::LANGUAGE.into())?),
        })
    }

    fn create_parser(language: Language) -> Result<Parser, WorkspaceError> {
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| WorkspaceError::Parse {
                path: "<grammar>".to_string(),
                message: e.to_string(),
            })?;
        Ok(parser)
    }

    pub fn parse(&self, path: &Path, source: &str) -> Result<SyntaxNode, WorkspaceError> {
        let parse_error = |message: &str| WorkspaceError::Parse {
            path: path.display().to_string(),
            message: message.to_string(),
        };

        let mut parser = self
            .parser
            .lock()
            .map_err(|_| parse_error("Parser lock poisoned"))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| parse_error("Failed to parse file"))?;

        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!("Syntax errors in {}, continuing", path.display());
        }

        let mut position = 0;
        let mut children = lower_children(root, source, &mut position);
        let trailing = source.get(position..).unwrap_or("");
        children.push(SyntaxToken::with_leading(END_OF_FILE, trailing, "").into());

        Ok(SyntaxNode::new(root.kind(), children))
    }
}

fn lower_children(node: Node<'_>, source: &str, position: &mut usize) -> Vec<SyntaxElement> {
    let mut children = Vec::with_capacity(node.child_count());
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.child_count() == 0 {
            children.push(lower_token(child, source, position).into());
        } else {
            let grandchildren = lower_children(child, source, position);
            children.push(SyntaxNode::new(child.kind(), grandchildren).into());
        }
    }
    children
}

fn lower_token(node: Node<'_>, source: &str, position: &mut usize) -> SyntaxToken {
    let start = node.start_byte().max(*position);
    let end = node.end_byte().max(start);
    let leading = source.get(*position..start).unwrap_or("");
    let text = source.get(start..end).unwrap_or("");
    *position = end;
    SyntaxToken::with_leading(node.kind(), leading, text)
}
