//! Immutable syntax tree
//!
//! Nodes are reference counted and never mutated in place. An edit rebuilds
//! the path from the root down to the replaced node and shares every other
//! subtree with the previous tree value. The text of a tree is exactly the
//! concatenation of each token's leading trivia followed by its text.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Kind of the zero-width token that carries trailing file trivia
pub const END_OF_FILE: &str = "end_of_file";

/// Identity of a syntax node.
///
/// Allocated once when a node is synthesized. Ancestors rebuilt during a
/// replacement keep their id, so an id can be looked up in any tree derived
/// from the one it was created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Marker attached to synthesized nodes for downstream passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Annotation {
    /// Whitespace inside the node should be normalized before the tree is shown
    Formatter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxToken {
    kind: &'static str,
    text: Arc<str>,
    leading: Arc<str>,
}

impl SyntaxToken {
    pub fn new(kind: &'static str, text: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: Arc::from(""),
        }
    }

    pub fn with_leading(
        kind: &'static str,
        leading: impl Into<Arc<str>>,
        text: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: leading.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn leading_trivia(&self) -> &str {
        &self.leading
    }

    pub fn with_leading_trivia(&self, trivia: &str) -> Self {
        Self {
            kind: self.kind,
            text: Arc::clone(&self.text),
            leading: Arc::from(trivia),
        }
    }

    pub fn full_len(&self) -> usize {
        self.leading.len() + self.text.len()
    }
}

#[derive(Debug, Clone)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(SyntaxToken),
}

impl SyntaxElement {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Node(node) => node.kind(),
            Self::Token(token) => token.kind(),
        }
    }

    pub fn full_len(&self) -> usize {
        match self {
            Self::Node(node) => node.full_len(),
            Self::Token(token) => token.full_len(),
        }
    }

    pub fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&SyntaxToken> {
        match self {
            Self::Node(_) => None,
            Self::Token(token) => Some(token),
        }
    }

    pub fn leading_trivia(&self) -> &str {
        match self {
            Self::Node(node) => node.leading_trivia(),
            Self::Token(token) => token.leading_trivia(),
        }
    }

    pub fn with_leading_trivia(&self, trivia: &str) -> Self {
        match self {
            Self::Node(node) => Self::Node(node.with_leading_trivia(trivia)),
            Self::Token(token) => Self::Token(token.with_leading_trivia(trivia)),
        }
    }

    /// Text without the leading trivia of the first token
    pub fn trimmed_text(&self) -> String {
        match self {
            Self::Node(node) => node.trimmed_text(),
            Self::Token(token) => token.text().to_string(),
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Self::Node(node) => node.write_to(out),
            Self::Token(token) => {
                out.push_str(token.leading_trivia());
                out.push_str(token.text());
            }
        }
    }
}

impl From<SyntaxNode> for SyntaxElement {
    fn from(node: SyntaxNode) -> Self {
        Self::Node(node)
    }
}

impl From<SyntaxToken> for SyntaxElement {
    fn from(token: SyntaxToken) -> Self {
        Self::Token(token)
    }
}

#[derive(Debug)]
struct NodeData {
    id: NodeId,
    kind: &'static str,
    children: Vec<SyntaxElement>,
    annotations: Vec<Annotation>,
    full_len: usize,
}

/// Cheaply clonable handle to an immutable node
#[derive(Debug, Clone)]
pub struct SyntaxNode(Arc<NodeData>);

impl SyntaxNode {
    /// Build a new node with a fresh identity
    pub fn new(kind: &'static str, children: Vec<SyntaxElement>) -> Self {
        Self::build(NodeId::fresh(), kind, children, Vec::new())
    }

    fn build(
        id: NodeId,
        kind: &'static str,
        children: Vec<SyntaxElement>,
        annotations: Vec<Annotation>,
    ) -> Self {
        let full_len = children.iter().map(SyntaxElement::full_len).sum();
        Self(Arc::new(NodeData {
            id,
            kind,
            children,
            annotations,
            full_len,
        }))
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn kind(&self) -> &'static str {
        self.0.kind
    }

    pub fn children(&self) -> &[SyntaxElement] {
        &self.0.children
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.0.children.iter().filter_map(SyntaxElement::as_node)
    }

    pub fn child_node(&self, kind: &str) -> Option<&SyntaxNode> {
        self.child_nodes().find(|n| n.kind() == kind)
    }

    pub fn child_token(&self, kind: &str) -> Option<&SyntaxToken> {
        self.0
            .children
            .iter()
            .filter_map(SyntaxElement::as_token)
            .find(|t| t.kind() == kind)
    }

    pub fn full_len(&self) -> usize {
        self.0.full_len
    }

    pub fn has_annotation(&self, annotation: Annotation) -> bool {
        self.0.annotations.contains(&annotation)
    }

    pub fn with_annotation(&self, annotation: Annotation) -> Self {
        if self.has_annotation(annotation) {
            return self.clone();
        }
        let mut annotations = self.0.annotations.clone();
        annotations.push(annotation);
        Self::build(self.id(), self.kind(), self.0.children.clone(), annotations)
    }

    pub fn without_annotation(&self, annotation: Annotation) -> Self {
        if !self.has_annotation(annotation) {
            return self.clone();
        }
        let annotations = self
            .0
            .annotations
            .iter()
            .copied()
            .filter(|a| *a != annotation)
            .collect();
        Self::build(self.id(), self.kind(), self.0.children.clone(), annotations)
    }

    /// Same identity and annotations, different children
    pub fn with_children(&self, children: Vec<SyntaxElement>) -> Self {
        Self::build(self.id(), self.kind(), children, self.0.annotations.clone())
    }

    /// True when both handles point at the same allocation
    pub fn ptr_eq(&self, other: &SyntaxNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn first_token(&self) -> Option<&SyntaxToken> {
        self.0.children.iter().find_map(|child| match child {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(node) => node.first_token(),
        })
    }

    pub fn leading_trivia(&self) -> &str {
        self.first_token().map(|t| t.leading_trivia()).unwrap_or("")
    }

    /// Replace the leading trivia of the first token, keeping identities
    pub fn with_leading_trivia(&self, trivia: &str) -> Self {
        let position = self.0.children.iter().position(|child| match child {
            SyntaxElement::Token(_) => true,
            SyntaxElement::Node(node) => node.first_token().is_some(),
        });
        let Some(index) = position else {
            return self.clone();
        };
        let mut children = self.0.children.clone();
        children[index] = children[index].with_leading_trivia(trivia);
        self.with_children(children)
    }

    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.full_len());
        self.write_to(&mut out);
        out
    }

    /// Text without the leading trivia of the first token
    pub fn trimmed_text(&self) -> String {
        let text = self.text();
        text[self.leading_trivia().len()..].to_string()
    }

    fn write_to(&self, out: &mut String) {
        for child in &self.0.children {
            child.write_to(out);
        }
    }

    /// Pre-order traversal including `self`
    pub fn descendants(&self) -> Descendants {
        Descendants {
            stack: vec![self.clone()],
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    pub fn find(&self, id: NodeId) -> Option<SyntaxNode> {
        self.descendants().find(|n| n.id() == id)
    }

    /// Nodes from `self` down to the node with `id`, both ends included
    pub fn path_to(&self, id: NodeId) -> Option<Vec<SyntaxNode>> {
        if self.id() == id {
            return Some(vec![self.clone()]);
        }
        for child in self.child_nodes() {
            if let Some(mut path) = child.path_to(id) {
                path.insert(0, self.clone());
                return Some(path);
            }
        }
        None
    }

    /// Structurally replace the node with `old` by `new`.
    ///
    /// Returns `None` when `old` is not reachable from `self`.
    pub fn replace_node(&self, old: NodeId, new: SyntaxNode) -> Option<SyntaxNode> {
        if self.id() == old {
            return Some(new);
        }
        for (index, child) in self.0.children.iter().enumerate() {
            let SyntaxElement::Node(node) = child else {
                continue;
            };
            if let Some(replaced) = node.replace_node(old, new.clone()) {
                let mut children = self.0.children.clone();
                children[index] = SyntaxElement::Node(replaced);
                return Some(self.with_children(children));
            }
        }
        None
    }

    /// Byte range of the node with `id`, leading trivia excluded
    pub fn text_range(&self, id: NodeId) -> Option<(usize, usize)> {
        self.range_from(id, 0)
    }

    fn range_from(&self, id: NodeId, start: usize) -> Option<(usize, usize)> {
        if self.id() == id {
            let begin = start + self.leading_trivia().len();
            return Some((begin, start + self.full_len()));
        }
        let mut offset = start;
        for child in &self.0.children {
            if let SyntaxElement::Node(node) = child
                && let Some(range) = node.range_from(id, offset)
            {
                return Some(range);
            }
            offset += child.full_len();
        }
        None
    }

    /// Innermost node whose text (leading trivia excluded) covers `offset`
    pub fn covering_node(&self, offset: usize) -> Option<SyntaxNode> {
        if offset > self.full_len() {
            return None;
        }
        let mut current = self.clone();
        let mut start = 0;
        loop {
            let mut next = None;
            let mut child_start = start;
            for child in current.children() {
                let end = child_start + child.full_len();
                if let SyntaxElement::Node(node) = child {
                    let text_start = child_start + node.leading_trivia().len();
                    if offset >= text_start && offset < end {
                        next = Some((child_start, node.clone()));
                        break;
                    }
                }
                child_start = end;
            }
            match next {
                Some((child_start, node)) => {
                    start = child_start;
                    current = node;
                }
                None => return Some(current),
            }
        }
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

pub struct Descendants {
    stack: Vec<SyntaxNode>,
}

impl Iterator for Descendants {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(
            node.children()
                .iter()
                .rev()
                .filter_map(SyntaxElement::as_node)
                .cloned(),
        );
        Some(node)
    }
}
