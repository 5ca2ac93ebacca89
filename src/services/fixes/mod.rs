//! Code fix engine
//!
//! Providers turn one diagnostic into an ordered list of [`CodeAction`]s.
//! [`FixService`] routes diagnostics to the providers that claim their rule id.

pub mod action;
pub mod apply;
pub mod extract;
pub mod format;
pub mod serializable;
pub mod transform;

pub use action::{ActionPayload, CodeAction};
pub use extract::{CSharpFieldExtractor, FieldDeclarationExtractor};
pub use serializable::{FixOptions, MarkSerializableFixProvider, RULE_CA2235};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::FixError;
use crate::infra::CancellationToken;
use crate::models::diagnostic::Diagnostic;
use crate::models::document::{Document, DocumentId, Solution};
use crate::models::syntax::SyntaxNode;
use crate::services::semantic::{DocumentHost, SemanticModel};

/// Everything a provider may consult while computing fixes
#[derive(Clone)]
pub struct FixContext {
    pub solution: Solution,
    pub document_id: DocumentId,
    /// Innermost node at the diagnostic position
    pub node: SyntaxNode,
    pub diagnostic: Diagnostic,
    pub semantic: Arc<dyn SemanticModel>,
    pub host: Arc<dyn DocumentHost>,
    pub cancel: CancellationToken,
}

impl fmt::Debug for FixContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixContext")
            .field("document_id", &self.document_id)
            .field("node", &self.node.id())
            .field("diagnostic", &self.diagnostic)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl FixContext {
    /// Locate the flagged node of `diagnostic` in `solution`
    pub fn at_diagnostic(
        solution: Solution,
        diagnostic: Diagnostic,
        semantic: Arc<dyn SemanticModel>,
        host: Arc<dyn DocumentHost>,
    ) -> Result<Self, FixError> {
        let path = diagnostic.file_path.display().to_string();
        let document = solution
            .document_by_path(&diagnostic.file_path)
            .ok_or_else(|| FixError::DocumentNotFound(path.clone()))?;
        let offset = document
            .offset_at(diagnostic.line, diagnostic.column)
            .ok_or_else(|| {
                FixError::DocumentNotFound(format!(
                    "{}:{}:{}",
                    path, diagnostic.line, diagnostic.column
                ))
            })?;
        let node = document
            .root()
            .covering_node(offset)
            .unwrap_or_else(|| document.root().clone());
        let document_id = document.id();

        tracing::debug!("{} at {}:{} -> {}", diagnostic.id, path, offset, node.kind());
        Ok(Self {
            solution,
            document_id,
            node,
            diagnostic,
            semantic,
            host,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Document the diagnostic was reported in
    pub fn document(&self) -> Result<&Document, FixError> {
        self.solution
            .document(self.document_id)
            .ok_or_else(|| FixError::DocumentNotFound(self.document_id.to_string()))
    }
}

#[async_trait]
pub trait CodeFixProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rule ids this provider can fix; never changes for a provider
    fn fixable_diagnostic_ids(&self) -> &'static [&'static str];

    async fn compute_fixes(&self, ctx: &FixContext) -> Result<Vec<CodeAction>, FixError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleInfo {
    pub provider: &'static str,
    pub diagnostic_ids: Vec<&'static str>,
}

#[derive(Default)]
pub struct FixService {
    providers: Vec<Arc<dyn CodeFixProvider>>,
}

impl FixService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn CodeFixProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Service with every built-in provider
    pub fn with_defaults(options: FixOptions) -> Self {
        Self::new().with_provider(Arc::new(MarkSerializableFixProvider::new(options)))
    }

    pub fn rules(&self) -> Vec<RuleInfo> {
        self.providers
            .iter()
            .map(|p| RuleInfo {
                provider: p.name(),
                diagnostic_ids: p.fixable_diagnostic_ids().to_vec(),
            })
            .collect()
    }

    pub fn providers_for<'a>(
        &'a self,
        diagnostic_id: &'a str,
    ) -> impl Iterator<Item = &'a Arc<dyn CodeFixProvider>> + 'a {
        self.providers
            .iter()
            .filter(move |p| p.fixable_diagnostic_ids().iter().any(|id| *id == diagnostic_id))
    }

    /// Actions from every provider registered for the diagnostic's rule.
    ///
    /// A failing provider does not hide the actions of the others; its error
    /// is returned only when no provider produced anything.
    pub async fn fixes_for(&self, ctx: &FixContext) -> Result<Vec<CodeAction>, FixError> {
        let mut actions = Vec::new();
        let mut first_error = None;

        for provider in self.providers_for(&ctx.diagnostic.id) {
            match provider.compute_fixes(ctx).await {
                Ok(found) => {
                    tracing::debug!("{} offered {} action(s)", provider.name(), found.len());
                    actions.extend(found);
                }
                Err(err) => {
                    tracing::debug!("{} failed: {}", provider.name(), err);
                    first_error.get_or_insert(err);
                }
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
