//! Node transformer
//!
//! Inserts attribute lists into declarations. The result is a new node with a
//! fresh identity tagged for the formatter; the input node is left untouched.

use crate::error::FixError;
use crate::infra::ast::node_types::{
    self, ATTRIBUTE, ATTRIBUTE_LIST, FILE_SCOPED_NAMESPACE_DECLARATION, IDENTIFIER,
    NAMESPACE_DECLARATION, QUALIFIED_NAME, USING_DIRECTIVE,
};
use crate::models::attribute::{AttributeData, AttributeNameStyle};
use crate::models::config::NameStylePreference;
use crate::models::syntax::{Annotation, NodeId, SyntaxElement, SyntaxNode, SyntaxToken};

const ATTRIBUTE_NAMESPACE: &str = "System";

/// Add one attribute list per attribute after the existing attribute lists
/// of `node` and before its modifiers.
pub fn add_attributes(
    node: &SyntaxNode,
    attributes: &[AttributeData],
    style: AttributeNameStyle,
) -> Result<SyntaxNode, FixError> {
    if !node_types::is_attributable(node.kind()) {
        return Err(FixError::UnsupportedShape {
            kind: node.kind().to_string(),
        });
    }
    if attributes.is_empty() {
        return Ok(node.clone());
    }

    let children = node.children();
    let insert_at = children
        .iter()
        .rposition(|c| c.kind() == ATTRIBUTE_LIST)
        .map(|i| i + 1)
        .unwrap_or(0);

    let mut rebuilt: Vec<SyntaxElement> = Vec::with_capacity(children.len() + attributes.len());
    rebuilt.extend(children[..insert_at].iter().cloned());

    if insert_at == 0 {
        // the declaration's trivia moves in front of the first new list
        let leading = node.leading_trivia().to_string();
        for (i, attribute) in attributes.iter().enumerate() {
            let trivia = if i == 0 { leading.as_str() } else { "" };
            rebuilt.push(attribute_list(attribute, style, trivia).into());
        }
        rebuilt.extend(
            children
                .iter()
                .enumerate()
                .map(|(i, c)| if i == 0 { c.with_leading_trivia("") } else { c.clone() }),
        );
    } else {
        let separator = children
            .get(insert_at)
            .map(|c| c.leading_trivia().to_string())
            .unwrap_or_default();
        for attribute in attributes {
            rebuilt.push(attribute_list(attribute, style, &separator).into());
        }
        rebuilt.extend(children[insert_at..].iter().cloned());
    }

    Ok(SyntaxNode::new(node.kind(), rebuilt).with_annotation(Annotation::Formatter))
}

/// `[Name]` with `leading` in front of the open bracket
fn attribute_list(attribute: &AttributeData, style: AttributeNameStyle, leading: &str) -> SyntaxNode {
    let name = attribute_name(&style.render(attribute));
    let attribute_node = SyntaxNode::new(ATTRIBUTE, vec![name]);
    SyntaxNode::new(
        ATTRIBUTE_LIST,
        vec![
            SyntaxToken::with_leading("[", leading, "[").into(),
            attribute_node.into(),
            SyntaxToken::new("]", "]").into(),
        ],
    )
}

/// Identifier token, or a left-nested qualified name for dotted names
fn attribute_name(rendered: &str) -> SyntaxElement {
    let mut segments = rendered.split('.');
    let first = segments.next().unwrap_or(rendered);
    let mut name: SyntaxElement = SyntaxToken::new(IDENTIFIER, first).into();
    for segment in segments {
        name = SyntaxNode::new(
            QUALIFIED_NAME,
            vec![
                name,
                SyntaxToken::new(".", ".").into(),
                SyntaxToken::new(IDENTIFIER, segment).into(),
            ],
        )
        .into();
    }
    name
}

/// Resolve the configured preference for a node inside `root`.
///
/// `Auto` spells the simple name when `System` is imported or the node sits in
/// a `System` namespace, and the qualified name otherwise.
pub fn name_style_for(
    preference: NameStylePreference,
    root: &SyntaxNode,
    target: NodeId,
) -> AttributeNameStyle {
    match preference {
        NameStylePreference::Simple => AttributeNameStyle::Simple,
        NameStylePreference::Qualified => AttributeNameStyle::Qualified,
        NameStylePreference::Auto => {
            if imports_system(root) || in_system_namespace(root, target) {
                AttributeNameStyle::Simple
            } else {
                AttributeNameStyle::Qualified
            }
        }
    }
}

fn imports_system(root: &SyntaxNode) -> bool {
    root.descendants()
        .filter(|n| n.kind() == USING_DIRECTIVE)
        .any(|directive| {
            let text = directive.trimmed_text();
            let text = text.trim();
            let text = text.strip_prefix("global").map(str::trim_start).unwrap_or(text);
            text.strip_prefix("using")
                .and_then(|rest| rest.trim().strip_suffix(';'))
                .is_some_and(|name| name.trim() == ATTRIBUTE_NAMESPACE)
        })
}

fn in_system_namespace(root: &SyntaxNode, target: NodeId) -> bool {
    let namespaces: Vec<SyntaxNode> = match root.path_to(target) {
        Some(path) => path
            .into_iter()
            .filter(|n| n.kind() == NAMESPACE_DECLARATION)
            .collect(),
        None => Vec::new(),
    };
    // file-scoped namespaces are siblings of the declarations they cover
    let file_scoped = root
        .child_nodes()
        .filter(|n| n.kind() == FILE_SCOPED_NAMESPACE_DECLARATION)
        .cloned();

    namespaces
        .into_iter()
        .chain(file_scoped)
        .filter_map(|ns| namespace_name(&ns))
        .any(|name| name == ATTRIBUTE_NAMESPACE || name.starts_with("System."))
}

fn namespace_name(namespace: &SyntaxNode) -> Option<String> {
    let children = namespace.children();
    let keyword = children.iter().position(|c| c.kind() == "namespace")?;
    children.get(keyword + 1).map(|name| name.trimmed_text())
}
