//! Diagnostic model
//!
//! A diagnostic as handed to the fix engine: a rule id and the flagged position.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule identifier, e.g. `CA2235`
    pub id: String,
    pub file_path: PathBuf,
    /// 1-indexed
    pub line: u32,
    /// 1-indexed
    pub column: u32,
    pub severity: DiagnosticSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Diagnostic {
    pub fn new(id: impl Into<String>, file_path: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            id: id.into(),
            file_path: file_path.into(),
            line,
            column,
            severity: DiagnosticSeverity::Warning,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl std::fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Information => write!(f, "info"),
            Self::Hint => write!(f, "hint"),
        }
    }
}
