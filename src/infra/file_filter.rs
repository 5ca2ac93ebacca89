//! Source discovery with .gitignore integration
//!
//! Uses the `ignore` crate (from ripgrep) for gitignore-style pattern matching.
//! On top of `.gitignore`, `.fixforge/ignore` and the configured ignored
//! paths are honored.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// File filter configuration
#[derive(Debug, Clone)]
pub struct FileFilterConfig {
    /// Root directory for relative path resolution
    pub root: PathBuf,
    /// Use .gitignore files for filtering
    pub respect_gitignore: bool,
    /// Path components that exclude a file anywhere below the root
    pub ignored_paths: Vec<String>,
    /// Hidden files/directories (starting with .)
    pub include_hidden: bool,
}

impl Default for FileFilterConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            respect_gitignore: true,
            ignored_paths: Vec::new(),
            include_hidden: false,
        }
    }
}

pub struct FileFilter {
    config: FileFilterConfig,
    fixforge_ignore: Option<Gitignore>,
}

impl FileFilter {
    pub fn new(config: FileFilterConfig) -> Self {
        let fixforge_ignore = Self::load_fixforge_ignore(&config.root);
        Self {
            config,
            fixforge_ignore,
        }
    }

    /// Load .fixforge/ignore
    fn load_fixforge_ignore(root: &Path) -> Option<Gitignore> {
        let ignore_path = root.join(".fixforge").join("ignore");
        if !ignore_path.exists() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(err) = builder.add(&ignore_path) {
            tracing::warn!("Failed to parse .fixforge/ignore: {}", err);
        }

        builder.build().ok()
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.config.root).unwrap_or(path);

        for component in relative.components() {
            if let std::path::Component::Normal(name) = component
                && let Some(name) = name.to_str()
                && self.config.ignored_paths.iter().any(|p| p == name)
            {
                return true;
            }
        }

        if let Some(ref ignore) = self.fixforge_ignore {
            match ignore.matched_path_or_any_parents(relative, path.is_dir()) {
                ignore::Match::Ignore(_) => return true,
                ignore::Match::Whitelist(_) => return false,
                ignore::Match::None => {}
            }
        }

        false
    }

    pub fn should_include(&self, path: &Path) -> bool {
        !self.is_ignored(path)
    }

    fn walk_builder(&self) -> WalkBuilder {
        let mut builder = WalkBuilder::new(&self.config.root);
        builder
            .hidden(!self.config.include_hidden)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            // .gitignore is honored outside of git repositories too
            .require_git(false);
        builder
    }

    /// All files with one of `extensions`, sorted by path
    pub fn discover_files(&self, extensions: &[&str]) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in self.walk_builder().build().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if !extensions.is_empty() {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                if !extensions.contains(&ext) {
                    continue;
                }
            }

            if self.should_include(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        files
    }
}
