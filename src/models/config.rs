//! Configuration model for fixforge

use serde::{Deserialize, Serialize};

/// fixforge configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FixforgeConfig {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub fixes: FixesConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: Option<String>,

    /// Source file extensions to load
    #[serde(default = "defaults::extensions")]
    pub extensions: Vec<String>,

    /// Path components to ignore
    #[serde(default = "default_ignored_paths")]
    pub ignored_paths: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            extensions: defaults::extensions(),
            ignored_paths: default_ignored_paths(),
        }
    }
}

fn default_ignored_paths() -> Vec<String> {
    vec![
        "bin".to_string(),
        "obj".to_string(),
        "packages".to_string(),
        ".git".to_string(),
        ".vs".to_string(),
        "node_modules".to_string(),
        ".fixforge".to_string(),
    ]
}

/// How synthesized attribute names are spelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NameStylePreference {
    /// Simple name when the namespace is imported, qualified otherwise
    #[default]
    Auto,
    Simple,
    Qualified,
}

impl std::str::FromStr for NameStylePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "simple" => Ok(Self::Simple),
            "qualified" => Ok(Self::Qualified),
            _ => Err(format!(
                "Unknown attribute name style: '{}'. Valid: auto, simple, qualified",
                s
            )),
        }
    }
}

/// Code fix configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixesConfig {
    /// Upper bound for fetching the syntax root of another document
    #[serde(default = "defaults::fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    #[serde(default)]
    pub attribute_names: NameStylePreference,
}

impl Default for FixesConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: defaults::fetch_timeout_ms(),
            attribute_names: NameStylePreference::default(),
        }
    }
}

/// Workspace loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "defaults::max_file_size_mb")]
    pub max_file_size_mb: u32,

    #[serde(default = "defaults::respect_gitignore")]
    pub respect_gitignore: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: defaults::max_file_size_mb(),
            respect_gitignore: defaults::respect_gitignore(),
        }
    }
}

impl WorkspaceConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        if self.max_file_size_mb == 0 {
            u64::MAX
        } else {
            self.max_file_size_mb as u64 * 1024 * 1024
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: defaults::format(),
        }
    }
}

mod defaults {
    // Project
    pub fn extensions() -> Vec<String> {
        vec!["cs".to_string()]
    }

    // Fixes
    pub fn fetch_timeout_ms() -> u64 {
        5000
    }

    // Workspace
    pub fn max_file_size_mb() -> u32 {
        5
    }
    pub fn respect_gitignore() -> bool {
        true
    }

    // Output
    pub fn format() -> String {
        "json".to_string()
    }
}
