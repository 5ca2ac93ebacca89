//! Output formatting for CLI commands

use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    /// Unknown names fall back to JSON
    pub fn from_config(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            _ => Self::Json,
        }
    }
}

/// Plain-text rendering of a response
pub trait TextRender {
    fn render_text(&self) -> String;
}

/// Output context shared by all commands
#[derive(Debug, Clone)]
pub struct OutputContext {
    /// Project root for relative path calculation
    root: PathBuf,
    format: OutputFormat,
}

impl OutputContext {
    pub fn new(root: PathBuf, format: OutputFormat) -> Self {
        Self { root, format }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Path relative to the project root when it lies inside it
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }

    /// Print a successful response; JSON fields sit next to `"success": true`
    pub fn print_success<T: Serialize + TextRender>(&self, data: &T) {
        match self.format {
            OutputFormat::Json => {
                let mut response = serde_json::to_value(data).unwrap_or(serde_json::json!({}));
                if let Some(obj) = response.as_object_mut() {
                    obj.insert("success".to_string(), serde_json::json!(true));
                }
                print_json(&response);
            }
            OutputFormat::Text => println!("{}", data.render_text()),
        }
    }

    pub fn print_error(&self, message: &str) {
        match self.format {
            OutputFormat::Json => print_json(&serde_json::json!({
                "success": false,
                "error": message
            })),
            OutputFormat::Text => println!("error: {message}"),
        }
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}
