//! Configuration service for fixforge

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ConfigError;
use crate::models::config::{FixforgeConfig, ProjectConfig};

#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn load(&self, global_only: bool) -> Result<FixforgeConfig, ConfigError>;
    fn config_path(&self, global: bool) -> PathBuf;
    async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError>;
}

pub struct DefaultConfigService {
    root: PathBuf,
}

impl DefaultConfigService {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn global_config_path() -> PathBuf {
        // XDG standard: ~/.config/fixforge/config.toml
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fixforge")
            .join("config.toml")
    }

    fn project_config_path(&self) -> PathBuf {
        self.root.join(".fixforge").join("config.toml")
    }

    async fn load_from_path(path: &Path) -> Result<Option<FixforgeConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(path).await?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    async fn write_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let config = FixforgeConfig::default();
        let content =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigService for DefaultConfigService {
    async fn load(&self, global_only: bool) -> Result<FixforgeConfig, ConfigError> {
        let global = Self::load_from_path(&Self::global_config_path())
            .await?
            .unwrap_or_default();
        if global_only {
            return Ok(global);
        }

        let config = match Self::load_from_path(&self.project_config_path()).await? {
            Some(project) => merge_config(global, project),
            None => global,
        };
        apply_env_overrides(config, |key| std::env::var(key).ok())
    }

    fn config_path(&self, global: bool) -> PathBuf {
        if global {
            Self::global_config_path()
        } else {
            self.project_config_path()
        }
    }

    async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError> {
        let path = self.config_path(global);

        if path.exists() && !force {
            return Err(ConfigError::InvalidValue {
                key: "config".to_string(),
                message: format!(
                    "Config already exists: {}. Use --force to overwrite.",
                    path.display()
                ),
            });
        }

        Self::write_default_config(&path).await?;
        Ok(path)
    }
}

/// Project settings win; ignored paths accumulate
fn merge_config(base: FixforgeConfig, overlay: FixforgeConfig) -> FixforgeConfig {
    let mut ignored_paths = base.project.ignored_paths;
    for path in overlay.project.ignored_paths {
        if !ignored_paths.contains(&path) {
            ignored_paths.push(path);
        }
    }

    FixforgeConfig {
        project: ProjectConfig {
            name: overlay.project.name.or(base.project.name),
            extensions: if overlay.project.extensions.is_empty() {
                base.project.extensions
            } else {
                overlay.project.extensions
            },
            ignored_paths,
        },
        fixes: overlay.fixes,
        workspace: overlay.workspace,
        output: overlay.output,
    }
}

fn apply_env_overrides(
    mut config: FixforgeConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<FixforgeConfig, ConfigError> {
    if let Some(val) = var("FIXFORGE_FETCH_TIMEOUT_MS") {
        config.fixes.fetch_timeout_ms = val.parse().map_err(|_| ConfigError::InvalidValue {
            key: "FIXFORGE_FETCH_TIMEOUT_MS".to_string(),
            message: format!("expected milliseconds, got '{}'", val),
        })?;
    }
    if let Some(val) = var("FIXFORGE_MAX_FILE_SIZE_MB") {
        config.workspace.max_file_size_mb =
            val.parse().map_err(|_| ConfigError::InvalidValue {
                key: "FIXFORGE_MAX_FILE_SIZE_MB".to_string(),
                message: format!("expected megabytes, got '{}'", val),
            })?;
    }
    if let Some(val) = var("FIXFORGE_ATTRIBUTE_NAMES") {
        config.fixes.attribute_names = val.parse().map_err(|message| ConfigError::InvalidValue {
            key: "FIXFORGE_ATTRIBUTE_NAMES".to_string(),
            message,
        })?;
    }
    if let Some(val) = var("FIXFORGE_OUTPUT_FORMAT") {
        config.output.format = val;
    }
    Ok(config)
}
