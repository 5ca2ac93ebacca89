//! Formatter for synthesized nodes
//!
//! Only nodes carrying [`Annotation::Formatter`] are touched: every element
//! that directly follows an attribute list without any separating trivia is
//! moved to its own line at the declaration's indentation. The annotation is
//! removed once the node is formatted.

use crate::infra::ast::node_types::ATTRIBUTE_LIST;
use crate::models::document::Document;
use crate::models::syntax::{Annotation, SyntaxElement, SyntaxNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub newline: &'static str,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { newline: "\n" }
    }
}

impl FormatOptions {
    /// Match the line endings already used by `text`
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            Self { newline: "\r\n" }
        } else {
            Self::default()
        }
    }
}

/// Format every annotated node of the document's tree
pub fn format_document(document: &Document) -> Document {
    let root = document.root();
    if !root
        .descendants()
        .any(|n| n.has_annotation(Annotation::Formatter))
    {
        return document.clone();
    }

    let options = FormatOptions::detect(&document.text());
    document.with_syntax_root(format_tree(root, &options))
}

/// Bottom-up pass; subtrees without annotations are returned as-is
pub fn format_tree(node: &SyntaxNode, options: &FormatOptions) -> SyntaxNode {
    let mut changed = false;
    let children: Vec<SyntaxElement> = node
        .children()
        .iter()
        .map(|child| match child {
            SyntaxElement::Node(inner) => {
                let formatted = format_tree(inner, options);
                if !formatted.ptr_eq(inner) {
                    changed = true;
                }
                SyntaxElement::Node(formatted)
            }
            SyntaxElement::Token(_) => child.clone(),
        })
        .collect();

    let node = if changed {
        node.with_children(children)
    } else {
        node.clone()
    };

    if node.has_annotation(Annotation::Formatter) {
        format_annotated(&node, options).without_annotation(Annotation::Formatter)
    } else {
        node
    }
}

fn format_annotated(node: &SyntaxNode, options: &FormatOptions) -> SyntaxNode {
    let separator = separator_for(node.leading_trivia(), options);

    let mut changed = false;
    let mut children: Vec<SyntaxElement> = node.children().to_vec();
    for i in 1..children.len() {
        if children[i - 1].kind() == ATTRIBUTE_LIST && children[i].leading_trivia().is_empty() {
            children[i] = children[i].with_leading_trivia(&separator);
            changed = true;
        }
    }

    if changed {
        node.with_children(children)
    } else {
        node.clone()
    }
}

/// A line break plus the declaration's indentation, or a single space for
/// declarations that share a line with preceding code
fn separator_for(leading: &str, options: &FormatOptions) -> String {
    if !leading.is_empty() && !leading.contains('\n') {
        return " ".to_string();
    }
    let last_line = leading.rsplit('\n').next().unwrap_or("");
    let indent = &last_line[last_line.trim_end_matches([' ', '\t']).len()..];
    format!("{}{}", options.newline, indent)
}
