//! Application container for fixforge

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{OutputContext, OutputFormat};
use crate::config;
use crate::models::config::FixforgeConfig;
use crate::models::diagnostic::Diagnostic;
use crate::services::config::{ConfigService, DefaultConfigService};
use crate::services::fixes::{FixContext, FixOptions, FixService};
use crate::services::semantic::{CSharpSemanticModel, SnapshotHost};
use crate::services::workspace::{DefaultWorkspaceService, Workspace, WorkspaceService};

pub struct App {
    root: PathBuf,
    cwd: PathBuf,
    pub(crate) output: OutputContext,
    pub(crate) config_service: Arc<dyn ConfigService>,
    pub(crate) workspace_service: Arc<dyn WorkspaceService>,
    pub(crate) fixes: FixService,
    pub(crate) config: FixforgeConfig,
}

impl App {
    pub async fn new(root: Option<PathBuf>, format: Option<OutputFormat>) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        let root = match root {
            Some(root) if root.is_absolute() => root,
            Some(root) => cwd.join(root),
            None => cwd.clone(),
        };

        tracing::debug!("Initializing fixforge at {:?}", root);

        let config_service = Arc::new(DefaultConfigService::new(&root));
        let config = config_service.load(false).await.unwrap_or_else(|e| {
            tracing::warn!("Falling back to default config: {}", e);
            FixforgeConfig::default()
        });

        config::init(&config);

        let format = format.unwrap_or_else(|| OutputFormat::from_config(&config.output.format));
        let output = OutputContext::new(root.clone(), format);
        let workspace_service = Arc::new(DefaultWorkspaceService::new(&root, &config));
        let fixes = FixService::with_defaults(FixOptions {
            fetch_timeout: config::fetch_timeout(),
            name_style: config.fixes.attribute_names,
        });

        Ok(Self {
            root,
            cwd,
            output,
            config_service,
            workspace_service,
            fixes,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &FixforgeConfig {
        &self.config
    }

    pub async fn load_workspace(&self) -> anyhow::Result<Workspace> {
        self.workspace_service
            .load()
            .await
            .with_context(|| format!("Failed to load workspace at {}", self.root.display()))
    }

    /// Fix context for a diagnostic reported at `file:line:column`
    pub fn fix_context(
        &self,
        workspace: &Workspace,
        rule: &str,
        file: &Path,
        line: u32,
        column: u32,
    ) -> anyhow::Result<FixContext> {
        let relative = workspace.relative_path(file, &self.cwd)?;
        let diagnostic = Diagnostic::new(rule, relative, line, column);
        let solution = workspace.solution().clone();
        let semantic = Arc::new(CSharpSemanticModel::new(&solution));

        Ok(FixContext::at_diagnostic(
            solution,
            diagnostic,
            semantic,
            Arc::new(SnapshotHost),
        )?)
    }
}
