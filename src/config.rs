//! Global Configuration Singleton

use std::sync::OnceLock;
use std::time::Duration;

use crate::models::config::FixforgeConfig;

static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub fetch_timeout: Duration,
    pub max_file_size_bytes: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from(&FixforgeConfig::default())
    }
}

impl From<&FixforgeConfig> for RuntimeConfig {
    fn from(config: &FixforgeConfig) -> Self {
        Self {
            fetch_timeout: Duration::from_millis(config.fixes.fetch_timeout_ms),
            max_file_size_bytes: config.workspace.max_file_size_bytes(),
        }
    }
}

pub fn init(config: &FixforgeConfig) {
    let _ = CONFIG.set(RuntimeConfig::from(config));
}

pub fn fetch_timeout() -> Duration {
    config().fetch_timeout
}

pub fn max_file_size_bytes() -> u64 {
    config().max_file_size_bytes
}

fn config() -> RuntimeConfig {
    CONFIG.get().cloned().unwrap_or_default()
}
