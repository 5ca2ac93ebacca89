//! Edit application
//!
//! Pure node replacement at document and solution scope.

use crate::error::FixError;
use crate::models::document::{Document, Solution};
use crate::models::syntax::{NodeId, SyntaxNode};

/// Replace `old` in the document's tree with `new`
pub fn replace_in_document(
    document: &Document,
    old: NodeId,
    new: SyntaxNode,
) -> Result<Document, FixError> {
    replace_in_tree(document, document.root(), old, new)
}

/// Replace `old` inside `root`, a tree served for `document`, and make the
/// result the document's new tree
fn replace_in_tree(
    document: &Document,
    root: &SyntaxNode,
    old: NodeId,
    new: SyntaxNode,
) -> Result<Document, FixError> {
    let root = root
        .replace_node(old, new)
        .ok_or_else(|| FixError::node_not_found(old, document.path().display().to_string()))?;
    Ok(document.with_syntax_root(root))
}

/// Replace `old` in `root`, the current tree of whichever document of the
/// solution owns `old`.
///
/// Every other document is carried over unchanged.
pub fn replace_across_solution(
    solution: &Solution,
    root: &SyntaxNode,
    old: NodeId,
    new: SyntaxNode,
) -> Result<Solution, FixError> {
    let document = solution
        .document_owning(old)
        .ok_or_else(|| FixError::node_not_found(old, "solution"))?;
    let path = document.path().display().to_string();

    let updated = replace_in_tree(document, root, old, new)?;
    tracing::debug!("Replaced {} in {}", old, path);

    solution
        .with_document(updated)
        .ok_or(FixError::DocumentNotFound(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ast::CSharpParser;
    use crate::infra::ast::node_types::CLASS_DECLARATION;
    use crate::models::document::Project;
    use crate::models::syntax::SyntaxToken;
    use std::path::Path;

    fn two_files() -> Solution {
        let parser = CSharpParser::new().unwrap();
        let a = parser.parse(Path::new("A.cs"), "class A { }\n").unwrap();
        let b = parser.parse(Path::new("B.cs"), "class B { }\n").unwrap();
        let (project, _) = Project::new("demo").with_new_document("A.cs", a);
        let (project, _) = project.with_new_document("B.cs", b);
        Solution::new().with_project(project)
    }

    fn class_in(solution: &Solution, path: &str) -> SyntaxNode {
        solution
            .document_by_path(Path::new(path))
            .unwrap()
            .root()
            .descendants()
            .find(|n| n.kind() == CLASS_DECLARATION)
            .unwrap()
    }

    fn replacement(text: &str) -> SyntaxNode {
        SyntaxNode::new(
            CLASS_DECLARATION,
            vec![SyntaxToken::new("identifier", text).into()],
        )
    }

    #[test]
    fn test_replace_in_document() {
        let solution = two_files();
        let document = solution.document_by_path(Path::new("A.cs")).unwrap();
        let class = class_in(&solution, "A.cs");

        let updated = replace_in_document(document, class.id(), replacement("class Z { }")).unwrap();
        assert_eq!(updated.text(), "class Z { }\n");
        assert_eq!(updated.version(), document.version() + 1);
        assert_eq!(updated.id(), document.id());
    }

    #[test]
    fn test_replace_across_solution_touches_owner_only() {
        let solution = two_files();
        let class = class_in(&solution, "B.cs");
        let root = solution.document_by_path(Path::new("B.cs")).unwrap().root().clone();

        let next =
            replace_across_solution(&solution, &root, class.id(), replacement("class Y { }")).unwrap();

        let a_before = solution.document_by_path(Path::new("A.cs")).unwrap();
        let a_after = next.document_by_path(Path::new("A.cs")).unwrap();
        assert!(a_after.root().ptr_eq(a_before.root()));
        assert_eq!(
            next.document_by_path(Path::new("B.cs")).unwrap().text(),
            "class Y { }\n"
        );
        assert_eq!(next.changed_documents(&solution).len(), 1);
    }

    #[test]
    fn test_replace_across_solution_uses_given_root() {
        let solution = two_files();
        let class = class_in(&solution, "B.cs");
        let body = class.child_node("declaration_list").unwrap().clone();
        let document = solution.document_by_path(Path::new("B.cs")).unwrap();
        // a tree the snapshot has not seen yet
        let newer = document
            .root()
            .replace_node(class.id(), class.with_leading_trivia("// newer\n"))
            .unwrap();

        let filled = SyntaxNode::new(
            "declaration_list",
            vec![SyntaxToken::with_leading("{", " ", "{ int x; }").into()],
        );
        let next = replace_across_solution(&solution, &newer, body.id(), filled).unwrap();
        assert_eq!(
            next.document_by_path(Path::new("B.cs")).unwrap().text(),
            "// newer\nclass B { int x; }\n"
        );
    }

    #[test]
    fn test_missing_target() {
        let solution = two_files();
        let stray = replacement("class Q { }");

        let document = solution.documents().next().unwrap();
        let err = replace_across_solution(&solution, document.root(), stray.id(), stray.clone())
            .unwrap_err();
        assert!(err.is_stale());

        let err = replace_in_document(document, stray.id(), stray.clone()).unwrap_err();
        assert!(matches!(err, FixError::NodeNotFound { .. }));
    }
}
