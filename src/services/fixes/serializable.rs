//! CA2235: mark all non-serializable fields
//!
//! Offers two independent actions for a flagged field of a serializable type:
//! exclude the field from serialization with `[NonSerialized]`, or, when the
//! field's type is declared in source, mark that type `[Serializable]`. The
//! type may live in another document, whose root is fetched through the
//! [`DocumentHost`](crate::services::semantic::DocumentHost).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::error::FixError;
use crate::models::attribute::{AttributeData, WellKnownAttribute};
use crate::models::config::{FixesConfig, NameStylePreference};
use crate::models::document::Document;
use crate::models::syntax::SyntaxNode;

use super::action::{ActionPayload, CodeAction};
use super::apply::{replace_across_solution, replace_in_document};
use super::extract::{CSharpFieldExtractor, FieldDeclarationExtractor};
use super::transform::{add_attributes, name_style_for};
use super::{CodeFixProvider, FixContext};

pub const RULE_CA2235: &str = "CA2235";

pub const ADD_NON_SERIALIZED_TITLE: &str = "Add NonSerialized attribute";
pub const ADD_SERIALIZABLE_TITLE: &str = "Add Serializable attribute";

pub const ADD_NON_SERIALIZED_KEY: &str = "AddNonSerializedAttribute";
pub const ADD_SERIALIZABLE_KEY: &str = "AddSerializableAttribute";

const FIXABLE_IDS: &[&str] = &[RULE_CA2235];

#[derive(Debug, Clone)]
pub struct FixOptions {
    /// Bound on fetching another document's tree
    pub fetch_timeout: Duration,
    pub name_style: NameStylePreference,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self::from_config(&FixesConfig::default())
    }
}

impl FixOptions {
    pub fn from_config(config: &FixesConfig) -> Self {
        Self {
            fetch_timeout: Duration::from_millis(config.fetch_timeout_ms),
            name_style: config.attribute_names,
        }
    }
}

pub struct MarkSerializableFixProvider {
    extractor: Arc<dyn FieldDeclarationExtractor>,
    options: FixOptions,
}

impl MarkSerializableFixProvider {
    pub fn new(options: FixOptions) -> Self {
        Self::with_extractor(Arc::new(CSharpFieldExtractor), options)
    }

    pub fn with_extractor(extractor: Arc<dyn FieldDeclarationExtractor>, options: FixOptions) -> Self {
        Self { extractor, options }
    }

    fn synthesize(&self, ctx: &FixContext, attribute: WellKnownAttribute) -> Result<AttributeData, FixError> {
        ctx.semantic
            .attribute_descriptor(attribute)
            .map(AttributeData::new)
            .ok_or_else(|| FixError::AttributeUnavailable(attribute.metadata_name().to_string()))
    }

    /// `[NonSerialized]` on the field, edited within its own document
    fn non_serialized_fix(
        &self,
        ctx: &FixContext,
        document: &Document,
        field: &SyntaxNode,
    ) -> Result<CodeAction, FixError> {
        if !document.root().contains(field.id()) {
            return Err(FixError::node_not_found(
                field.id(),
                document.path().display().to_string(),
            ));
        }

        let attribute = self.synthesize(ctx, WellKnownAttribute::NonSerialized)?;
        let style = name_style_for(self.options.name_style, document.root(), field.id());
        let updated = add_attributes(field, &[attribute], style)?;

        let target = document.clone();
        let old = field.id();
        Ok(CodeAction::create(
            ADD_NON_SERIALIZED_TITLE,
            ADD_NON_SERIALIZED_KEY,
            ctx.solution.clone(),
            move || replace_in_document(&target, old, updated.clone()).map(ActionPayload::Document),
        ))
    }

    /// `[Serializable]` on the field's type, wherever it is declared.
    ///
    /// `Ok(None)` when the type has no declaration in source.
    async fn serializable_fix(&self, ctx: &FixContext) -> Result<Option<CodeAction>, FixError> {
        let Some(field) = ctx.semantic.declared_symbol(&ctx.node) else {
            debug!("No field symbol for {}", ctx.node.id());
            return Ok(None);
        };
        let Some(field_type) = ctx.semantic.field_type(&field) else {
            debug!("No declared type for field '{}'", field.name);
            return Ok(None);
        };
        if !field_type
            .locations
            .iter()
            .any(|location| ctx.semantic.is_in_source(location))
        {
            debug!("Type '{}' is not declared in source", field_type.name);
            return Ok(None);
        }
        if field_type.has_attribute("Serializable") {
            debug!("Type '{}' is already serializable", field_type.name);
            return Ok(None);
        }

        // partial types: only the first declaration is edited
        let Some(reference) = ctx.semantic.declaring_references(&field_type).into_iter().next() else {
            return Ok(None);
        };
        let declaration_id = reference.node.id();

        let document = ctx
            .solution
            .document_owning(declaration_id)
            .ok_or_else(|| FixError::node_not_found(declaration_id, "solution"))?;
        let root = self.fetch_root(ctx, document).await?;
        let declaration = root.find(declaration_id).ok_or_else(|| {
            FixError::node_not_found(declaration_id, document.path().display().to_string())
        })?;

        let attribute = self.synthesize(ctx, WellKnownAttribute::Serializable)?;
        let style = name_style_for(self.options.name_style, &root, declaration_id);
        let updated = add_attributes(&declaration, &[attribute], style)?;

        // splice into the fetched tree, which may be fresher than the snapshot's
        let solution = ctx.solution.clone();
        Ok(Some(CodeAction::create(
            ADD_SERIALIZABLE_TITLE,
            ADD_SERIALIZABLE_KEY,
            ctx.solution.clone(),
            move || {
                replace_across_solution(&solution, &root, declaration_id, updated.clone())
                    .map(ActionPayload::Solution)
            },
        )))
    }

    async fn fetch_root(&self, ctx: &FixContext, document: &Document) -> Result<SyntaxNode, FixError> {
        let path = document.path().display().to_string();
        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => Err(FixError::Cancelled),
            fetched = tokio::time::timeout(self.options.fetch_timeout, ctx.host.syntax_root(document)) => {
                fetched.map_err(|_| FixError::Timeout(path))?
            }
        }
    }
}

fn log_failure(title: &str, err: &FixError) {
    if err.is_precondition() {
        error!("'{}' aborted: {}", title, err);
    } else if err.is_cancelled() {
        debug!("'{}' dropped: {}", title, err);
    } else {
        warn!("'{}' skipped: {}", title, err);
    }
}

#[async_trait]
impl CodeFixProvider for MarkSerializableFixProvider {
    fn name(&self) -> &'static str {
        "mark-serializable"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        FIXABLE_IDS
    }

    async fn compute_fixes(&self, ctx: &FixContext) -> Result<Vec<CodeAction>, FixError> {
        if ctx.cancel.is_cancelled() {
            return Err(FixError::Cancelled);
        }

        let document = ctx.document()?;
        let Some(field) = self.extractor.field_declaration(document.root(), &ctx.node) else {
            debug!("{} is not inside a field declaration", ctx.node.id());
            return Ok(Vec::new());
        };

        let mut actions = Vec::with_capacity(2);
        let mut first_error = None;

        match self.non_serialized_fix(ctx, document, &field) {
            Ok(action) => actions.push(action),
            Err(err) => {
                log_failure(ADD_NON_SERIALIZED_TITLE, &err);
                first_error.get_or_insert(err);
            }
        }

        match self.serializable_fix(ctx).await {
            Ok(Some(action)) => actions.push(action),
            Ok(None) => {}
            Err(err) => {
                log_failure(ADD_SERIALIZABLE_TITLE, &err);
                first_error.get_or_insert(err);
            }
        }

        if actions.is_empty()
            && let Some(err) = first_error
        {
            return Err(err);
        }
        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::CancellationToken;
    use crate::infra::ast::CSharpParser;
    use crate::infra::ast::node_types::{CLASS_DECLARATION, FIELD_DECLARATION, VARIABLE_DECLARATOR};
    use crate::models::attribute::AttributeDescriptor;
    use crate::models::document::Solution;
    use crate::models::symbol::{Symbol, SyntaxReference};
    use crate::services::fixes::testing::{context, solution_from};
    use crate::services::semantic::{CSharpSemanticModel, DocumentHost, SemanticModel};
    use std::path::Path;

    const HOLDER: &str = "using System;\n\n[Serializable]\nclass Holder\n{\n    private Foo data;\n}\n";
    const FOO: &str = "class Foo\n{\n}\n";

    fn declarator(solution: &Solution, name: &str) -> SyntaxNode {
        solution
            .documents()
            .flat_map(|d| d.root().descendants())
            .find(|n| n.kind() == VARIABLE_DECLARATOR && n.trimmed_text() == name)
            .unwrap()
    }

    fn provider() -> MarkSerializableFixProvider {
        MarkSerializableFixProvider::new(FixOptions::default())
    }

    fn text_of(solution: &Solution, path: &str) -> String {
        solution.document_by_path(Path::new(path)).unwrap().text()
    }

    #[tokio::test]
    async fn test_two_fixes_across_documents() {
        let solution = solution_from(&[("Holder.cs", HOLDER), ("Foo.cs", FOO)]);
        let ctx = context(&solution, declarator(&solution, "data"));

        let actions = provider().compute_fixes(&ctx).await.unwrap();
        let titles: Vec<_> = actions.iter().map(|a| a.title()).collect();
        assert_eq!(titles, vec![ADD_NON_SERIALIZED_TITLE, ADD_SERIALIZABLE_TITLE]);
        assert_eq!(actions[1].equivalence_key(), ADD_SERIALIZABLE_KEY);

        let first = actions[0].changed_solution().unwrap();
        assert_eq!(
            text_of(&first, "Holder.cs"),
            "using System;\n\n[Serializable]\nclass Holder\n{\n    [NonSerialized]\n    private Foo data;\n}\n"
        );
        assert_eq!(text_of(&first, "Foo.cs"), FOO);

        let second = actions[1].changed_solution().unwrap();
        assert_eq!(text_of(&second, "Holder.cs"), HOLDER);
        // Foo.cs has no `using System;`
        assert_eq!(text_of(&second, "Foo.cs"), "[System.Serializable]\nclass Foo\n{\n}\n");
        assert_eq!(second.changed_documents(&solution).len(), 1);
    }

    #[tokio::test]
    async fn test_external_type_gets_one_fix() {
        let solution = solution_from(&[(
            "Holder.cs",
            "using System;\nclass Holder\n{\n    private System.IO.Stream stream;\n}\n",
        )]);
        let ctx = context(&solution, declarator(&solution, "stream"));

        let actions = provider().compute_fixes(&ctx).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title(), ADD_NON_SERIALIZED_TITLE);
    }

    #[tokio::test]
    async fn test_same_document_type() {
        let source = "using System;\nclass Foo { }\n[Serializable]\nclass Holder\n{\n    Foo data;\n}\n";
        let solution = solution_from(&[("Holder.cs", source)]);
        let ctx = context(&solution, declarator(&solution, "data"));

        let actions = provider().compute_fixes(&ctx).await.unwrap();
        assert_eq!(actions.len(), 2);
        let changed = actions[1].changed_solution().unwrap();
        assert!(text_of(&changed, "Holder.cs").contains("[Serializable]\nclass Foo { }"));
    }

    #[tokio::test]
    async fn test_not_a_field_yields_nothing() {
        let solution = solution_from(&[("Foo.cs", "class Foo\n{\n    void Run() { }\n}\n")]);
        let method = solution
            .documents()
            .flat_map(|d| d.root().descendants())
            .find(|n| n.kind() == "method_declaration")
            .unwrap();
        let ctx = context(&solution, method);

        assert!(provider().compute_fixes(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_orchestration_is_equivalent() {
        let solution = solution_from(&[("Holder.cs", HOLDER), ("Foo.cs", FOO)]);
        let ctx = context(&solution, declarator(&solution, "data"));
        let provider = provider();

        let first = provider.compute_fixes(&ctx).await.unwrap();
        let second = provider.compute_fixes(&ctx).await.unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.title(), b.title());
            let left = a.changed_solution().unwrap();
            let right = b.changed_solution().unwrap();
            for path in ["Holder.cs", "Foo.cs"] {
                assert_eq!(text_of(&left, path), text_of(&right, path));
            }
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let solution = solution_from(&[("Holder.cs", HOLDER), ("Foo.cs", FOO)]);
        let mut ctx = context(&solution, declarator(&solution, "data"));
        let cancel = CancellationToken::new();
        cancel.cancel();
        ctx.cancel = cancel;

        let err = provider().compute_fixes(&ctx).await.unwrap_err();
        assert!(matches!(err, FixError::Cancelled));
    }

    struct PendingHost;

    #[async_trait]
    impl DocumentHost for PendingHost {
        async fn syntax_root(&self, _document: &Document) -> Result<SyntaxNode, FixError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancel_during_fetch_keeps_first_fix() {
        let solution = solution_from(&[("Holder.cs", HOLDER), ("Foo.cs", FOO)]);
        let mut ctx = context(&solution, declarator(&solution, "data"));
        ctx.host = Arc::new(PendingHost);

        let cancel = ctx.cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let actions = provider().compute_fixes(&ctx).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title(), ADD_NON_SERIALIZED_TITLE);
    }

    #[tokio::test]
    async fn test_fetch_timeout_keeps_first_fix() {
        let solution = solution_from(&[("Holder.cs", HOLDER), ("Foo.cs", FOO)]);
        let mut ctx = context(&solution, declarator(&solution, "data"));
        ctx.host = Arc::new(PendingHost);

        let provider = MarkSerializableFixProvider::new(FixOptions {
            fetch_timeout: Duration::from_millis(10),
            ..FixOptions::default()
        });
        let actions = provider.compute_fixes(&ctx).await.unwrap();
        assert_eq!(actions.len(), 1);
    }

    /// Semantic model that resolves nothing about attributes
    struct NoAttributes(CSharpSemanticModel);

    impl SemanticModel for NoAttributes {
        fn declared_symbol(&self, node: &SyntaxNode) -> Option<Symbol> {
            self.0.declared_symbol(node)
        }
        fn field_type(&self, field: &Symbol) -> Option<Symbol> {
            self.0.field_type(field)
        }
        fn declaring_references(&self, symbol: &Symbol) -> Vec<SyntaxReference> {
            self.0.declaring_references(symbol)
        }
        fn attribute_descriptor(&self, _attribute: WellKnownAttribute) -> Option<AttributeDescriptor> {
            None
        }
    }

    #[tokio::test]
    async fn test_all_candidates_failing_returns_first_error() {
        let solution = solution_from(&[("Holder.cs", HOLDER), ("Foo.cs", FOO)]);
        let mut ctx = context(&solution, declarator(&solution, "data"));
        ctx.semantic = Arc::new(NoAttributes(CSharpSemanticModel::new(&solution)));

        let err = provider().compute_fixes(&ctx).await.unwrap_err();
        assert!(matches!(err, FixError::AttributeUnavailable(ref name) if name == "System.NonSerializedAttribute"));
    }

    /// Extractor that hands back a node from outside the document
    struct DetachedExtractor;

    impl FieldDeclarationExtractor for DetachedExtractor {
        fn field_declaration(&self, _root: &SyntaxNode, _node: &SyntaxNode) -> Option<SyntaxNode> {
            Some(SyntaxNode::new(FIELD_DECLARATION, Vec::new()))
        }
    }

    #[tokio::test]
    async fn test_failing_first_candidate_keeps_second() {
        let solution = solution_from(&[("Holder.cs", HOLDER), ("Foo.cs", FOO)]);
        let ctx = context(&solution, declarator(&solution, "data"));
        let provider = MarkSerializableFixProvider::with_extractor(
            Arc::new(DetachedExtractor),
            FixOptions::default(),
        );

        let actions = provider.compute_fixes(&ctx).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title(), ADD_SERIALIZABLE_TITLE);
    }

    #[tokio::test]
    async fn test_stale_apply() {
        let solution = solution_from(&[("Holder.cs", HOLDER), ("Foo.cs", FOO)]);
        let ctx = context(&solution, declarator(&solution, "data"));
        let actions = provider().compute_fixes(&ctx).await.unwrap();

        // someone else edits Foo.cs first
        let foo = solution.document_by_path(Path::new("Foo.cs")).unwrap();
        let reparsed = CSharpParser::new()
            .unwrap()
            .parse(Path::new("Foo.cs"), "class Foo\n{\n    int userEdit;\n}\n")
            .unwrap();
        let edited = solution
            .with_document(foo.with_syntax_root(reparsed))
            .unwrap();

        assert!(actions[1].apply(&edited).unwrap_err().is_stale());
        // the field fix does not touch Foo.cs
        assert!(actions[0].apply(&edited).is_ok());
    }

    #[tokio::test]
    async fn test_stale_apply_on_sibling_snapshot() {
        let solution = solution_from(&[("Holder.cs", HOLDER), ("Foo.cs", FOO)]);
        let foo = solution.document_by_path(Path::new("Foo.cs")).unwrap();

        // both snapshots move Foo.cs to version 1
        let ours = solution
            .with_document(foo.with_syntax_root(foo.root().clone()))
            .unwrap();
        let reparsed = CSharpParser::new()
            .unwrap()
            .parse(Path::new("Foo.cs"), "class Foo\n{\n    int userEdit;\n}\n")
            .unwrap();
        let theirs = solution
            .with_document(foo.with_syntax_root(reparsed))
            .unwrap();

        let ctx = context(&ours, declarator(&ours, "data"));
        let actions = provider().compute_fixes(&ctx).await.unwrap();
        assert_eq!(actions.len(), 2);

        assert!(actions[1].apply(&theirs).unwrap_err().is_stale());
        assert!(text_of(&theirs, "Foo.cs").contains("int userEdit;"));
        assert!(actions[1].apply(&ours).is_ok());
    }

    #[tokio::test]
    async fn test_partial_type_edits_first_declaration_only() {
        let partial = "partial class Foo\n{\n}\n";
        let solution = solution_from(&[
            ("B.cs", partial),
            ("Holder.cs", HOLDER),
            ("A.cs", partial),
        ]);
        let ctx = context(&solution, declarator(&solution, "data"));

        let actions = provider().compute_fixes(&ctx).await.unwrap();
        assert_eq!(actions.len(), 2);

        let changed = actions[1].changed_solution().unwrap();
        assert_eq!(changed.changed_documents(&solution).len(), 1);
        assert_eq!(
            text_of(&changed, "A.cs"),
            "[System.Serializable]\npartial class Foo\n{\n}\n"
        );
        assert_eq!(text_of(&changed, "B.cs"), partial);
    }

    #[tokio::test]
    async fn test_already_serializable_type_gets_field_fix_only() {
        let source = "using System;\n\n[Serializable]\nclass Node\n{\n    private Node next;\n}\n";
        let solution = solution_from(&[("Node.cs", source)]);
        let ctx = context(&solution, declarator(&solution, "next"));

        let actions = provider().compute_fixes(&ctx).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title(), ADD_NON_SERIALIZED_TITLE);
    }

    #[tokio::test]
    async fn test_qualified_serializable_on_other_partial_counts() {
        let solution = solution_from(&[
            ("Holder.cs", HOLDER),
            ("A.cs", "partial class Foo\n{\n}\n"),
            ("B.cs", "[System.SerializableAttribute]\npartial class Foo\n{\n}\n"),
        ]);
        let ctx = context(&solution, declarator(&solution, "data"));

        let actions = provider().compute_fixes(&ctx).await.unwrap();
        assert_eq!(actions.len(), 1);
    }

    /// Host serving a tree newer than the snapshot the context holds
    struct FresherHost(SyntaxNode);

    #[async_trait]
    impl DocumentHost for FresherHost {
        async fn syntax_root(&self, document: &Document) -> Result<SyntaxNode, FixError> {
            if document.path() == Path::new("Foo.cs") {
                Ok(self.0.clone())
            } else {
                Ok(document.root().clone())
            }
        }
    }

    #[tokio::test]
    async fn test_type_fix_builds_on_fetched_root() {
        let solution = solution_from(&[("Holder.cs", HOLDER), ("Foo.cs", FOO)]);
        let foo = solution.document_by_path(Path::new("Foo.cs")).unwrap();
        let class = foo
            .root()
            .descendants()
            .find(|n| n.kind() == CLASS_DECLARATION)
            .unwrap();
        // same declaration, plus a comment the snapshot has not seen yet
        let fresher = foo
            .root()
            .replace_node(class.id(), class.with_leading_trivia("// host copy\n"))
            .unwrap();

        let mut ctx = context(&solution, declarator(&solution, "data"));
        ctx.host = Arc::new(FresherHost(fresher));

        let actions = provider().compute_fixes(&ctx).await.unwrap();
        let changed = actions[1].changed_solution().unwrap();
        assert_eq!(
            text_of(&changed, "Foo.cs"),
            "// host copy\n[System.Serializable]\nclass Foo\n{\n}\n"
        );
    }

    #[test]
    fn test_fixable_ids_are_constant() {
        let provider = provider();
        assert_eq!(provider.fixable_diagnostic_ids(), &["CA2235"]);
        assert_eq!(provider.fixable_diagnostic_ids(), provider.fixable_diagnostic_ids());
    }
}
