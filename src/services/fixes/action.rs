//! Code actions
//!
//! A code action is a titled, lazily computed change. Nothing is evaluated
//! until a host asks for the payload, and applying never mutates the snapshot
//! the action was derived from.

use std::fmt;
use std::sync::Arc;

use crate::error::FixError;
use crate::models::document::{Document, Solution};

use super::format::format_document;

/// Result of evaluating an action
#[derive(Debug, Clone)]
pub enum ActionPayload {
    /// Replacement for a single document
    Document(Document),
    /// Replacement for the whole solution
    Solution(Solution),
}

type Producer = Arc<dyn Fn() -> Result<ActionPayload, FixError> + Send + Sync>;

#[derive(Clone)]
pub struct CodeAction {
    title: String,
    equivalence_key: String,
    base: Solution,
    producer: Producer,
}

impl fmt::Debug for CodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAction")
            .field("title", &self.title)
            .field("equivalence_key", &self.equivalence_key)
            .finish_non_exhaustive()
    }
}

impl CodeAction {
    pub fn create<F>(
        title: impl Into<String>,
        equivalence_key: impl Into<String>,
        base: Solution,
        producer: F,
    ) -> Self
    where
        F: Fn() -> Result<ActionPayload, FixError> + Send + Sync + 'static,
    {
        Self {
            title: title.into(),
            equivalence_key: equivalence_key.into(),
            base,
            producer: Arc::new(producer),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn equivalence_key(&self) -> &str {
        &self.equivalence_key
    }

    /// Evaluate the producer and format the documents it changed
    pub fn compute(&self) -> Result<ActionPayload, FixError> {
        match (self.producer)()? {
            ActionPayload::Document(document) => {
                Ok(ActionPayload::Document(format_document(&document)))
            }
            ActionPayload::Solution(solution) => {
                let mut formatted = solution.clone();
                for id in solution.changed_documents(&self.base) {
                    let Some(document) = solution.document(id) else {
                        continue;
                    };
                    formatted = formatted
                        .with_document(format_document(document))
                        .ok_or_else(|| FixError::DocumentNotFound(id.to_string()))?;
                }
                Ok(ActionPayload::Solution(formatted))
            }
        }
    }

    /// The base snapshot with the payload folded in
    pub fn changed_solution(&self) -> Result<Solution, FixError> {
        match self.compute()? {
            ActionPayload::Solution(solution) => Ok(solution),
            ActionPayload::Document(document) => {
                let path = document.path().display().to_string();
                self.base
                    .with_document(document)
                    .ok_or(FixError::DocumentNotFound(path))
            }
        }
    }

    /// Documents of the base snapshot this action rewrites
    pub fn changed_documents(&self) -> Result<Vec<Document>, FixError> {
        let changed = self.changed_solution()?;
        Ok(changed
            .changed_documents(&self.base)
            .into_iter()
            .filter_map(|id| changed.document(id).cloned())
            .collect())
    }

    /// Apply to `current`.
    ///
    /// Every document the action touches must still hold the tree it had in
    /// the base snapshot; otherwise the action is stale and `current` is left
    /// as it was. Versions alone are not enough: sibling snapshots forked from
    /// the same base share version numbers.
    pub fn apply(&self, current: &Solution) -> Result<Solution, FixError> {
        let changed = self.changed_documents()?;

        let mut result = current.clone();
        for document in changed {
            let path = document.path().display().to_string();
            let found = current
                .document(document.id())
                .ok_or_else(|| FixError::DocumentNotFound(path.clone()))?;
            if let Some(base) = self.base.document(document.id())
                && !base.root().ptr_eq(found.root())
            {
                return Err(FixError::StaleSnapshot {
                    path,
                    expected: base.version(),
                    found: found.version(),
                });
            }
            result = result
                .with_document(document)
                .ok_or(FixError::DocumentNotFound(path))?;
        }

        tracing::debug!("Applied '{}'", self.title);
        Ok(result)
    }
}
