//! Service layer for fixforge

pub mod config;
pub mod fixes;
pub mod semantic;
pub mod workspace;

pub use config::{ConfigService, DefaultConfigService};
pub use fixes::{CodeAction, CodeFixProvider, FixContext, FixService};
pub use semantic::{CSharpSemanticModel, DocumentHost, SemanticModel, SnapshotHost};
pub use workspace::{DefaultWorkspaceService, Workspace, WorkspaceService};

pub(crate) fn max_file_size_bytes() -> u64 {
    crate::config::max_file_size_bytes()
}
