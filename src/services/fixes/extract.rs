//! Field declaration extraction

use crate::infra::ast::node_types::FIELD_DECLARATION;
use crate::models::syntax::SyntaxNode;

/// Maps a flagged node to the field declaration a fix should edit
pub trait FieldDeclarationExtractor: Send + Sync {
    /// The declaration containing `node`, taken from `root`
    fn field_declaration(&self, root: &SyntaxNode, node: &SyntaxNode) -> Option<SyntaxNode>;
}

/// Nearest enclosing `field_declaration`, the node itself included
#[derive(Debug, Default, Clone, Copy)]
pub struct CSharpFieldExtractor;

impl FieldDeclarationExtractor for CSharpFieldExtractor {
    fn field_declaration(&self, root: &SyntaxNode, node: &SyntaxNode) -> Option<SyntaxNode> {
        root.path_to(node.id())?
            .into_iter()
            .rev()
            .find(|n| n.kind() == FIELD_DECLARATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ast::CSharpParser;
    use std::path::Path;

    fn parse(source: &str) -> SyntaxNode {
        CSharpParser::new()
            .unwrap()
            .parse(Path::new("Test.cs"), source)
            .unwrap()
    }

    #[test]
    fn test_finds_enclosing_field() {
        let root = parse("class Foo\n{\n    private object data;\n}\n");
        let declarator = root
            .descendants()
            .find(|n| n.kind() == "variable_declarator")
            .unwrap();

        let field = CSharpFieldExtractor
            .field_declaration(&root, &declarator)
            .unwrap();
        assert_eq!(field.kind(), FIELD_DECLARATION);
        assert_eq!(field.trimmed_text(), "private object data;");

        let again = CSharpFieldExtractor.field_declaration(&root, &field).unwrap();
        assert_eq!(again.id(), field.id());
    }

    #[test]
    fn test_no_field() {
        let root = parse("class Foo\n{\n    void Run() { }\n}\n");
        let method = root
            .descendants()
            .find(|n| n.kind() == "method_declaration")
            .unwrap();
        assert!(CSharpFieldExtractor.field_declaration(&root, &method).is_none());

        let foreign = parse("class Bar { int x; }\n");
        assert!(CSharpFieldExtractor.field_declaration(&root, &foreign).is_none());
    }
}
