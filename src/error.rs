//! Error types for fixforge

use std::path::PathBuf;

use thiserror::Error;

use crate::models::syntax::NodeId;

#[derive(Debug, Error)]
pub enum FixError {
    #[error("Edit target {node} not found in {location}. Recompute fixes and retry.")]
    NodeNotFound { node: NodeId, location: String },

    #[error("{path} changed since the fix was computed (version {expected}, now {found}). Recompute fixes and retry.")]
    StaleSnapshot {
        path: String,
        expected: u64,
        found: u64,
    },

    #[error("Document not found in solution: {0}")]
    DocumentNotFound(String),

    #[error("Node kind '{kind}' cannot carry attributes")]
    UnsupportedShape { kind: String },

    #[error("Attribute type not available: {0}")]
    AttributeUnavailable(String),

    #[error("Fix computation cancelled")]
    Cancelled,

    #[error("Timed out fetching syntax root for {0}")]
    Timeout(String),
}

impl FixError {
    pub fn node_not_found(node: NodeId, location: impl Into<String>) -> Self {
        Self::NodeNotFound {
            node,
            location: location.into(),
        }
    }

    /// The snapshot moved on since the edit was derived
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound { .. } | Self::StaleSnapshot { .. } | Self::DocumentNotFound(_)
        )
    }

    /// A defect in the caller or the extraction step rather than in the input
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedShape { .. } | Self::AttributeUnavailable(_)
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout(_))
    }
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("File too large ({size_mb}MB > {limit_mb}MB limit): {path}")]
    FileTooLarge {
        path: String,
        size_mb: u64,
        limit_mb: u64,
    },

    #[error("No C# source files found under {0}")]
    NoSourceFiles(PathBuf),

    #[error("File is not part of the workspace: {0}")]
    NotInWorkspace(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
