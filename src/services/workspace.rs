//! Workspace loading
//!
//! Discovers C# sources below a root directory, parses each one and builds a
//! single-project solution snapshot. Document paths are stored relative to
//! the root.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::WorkspaceError;
use crate::infra::ast::CSharpParser;
use crate::infra::file_filter::{FileFilter, FileFilterConfig};
use crate::models::config::FixforgeConfig;
use crate::models::document::{Document, Project, ProjectId, Solution};

#[async_trait]
pub trait WorkspaceService: Send + Sync {
    /// Parse every source file into a fresh solution snapshot
    async fn load(&self) -> Result<Workspace, WorkspaceError>;
}

/// A loaded solution and the directory it was read from
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    project: ProjectId,
    solution: Solution,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Workspace-relative path of `path`, which may be relative to `cwd`
    pub fn relative_path(&self, path: &Path, cwd: &Path) -> Result<PathBuf, WorkspaceError> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };
        let absolute = absolute.canonicalize().unwrap_or(absolute);
        absolute
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .map_err(|_| WorkspaceError::NotInWorkspace(path.to_path_buf()))
    }

    pub fn document(&self, relative: &Path) -> Result<&Document, WorkspaceError> {
        self.solution
            .document_by_path(relative)
            .ok_or_else(|| WorkspaceError::NotInWorkspace(relative.to_path_buf()))
    }

    /// Write a document's text back to disk
    pub async fn write_document(&self, document: &Document) -> Result<PathBuf, WorkspaceError> {
        let path = self.root.join(document.path());
        tokio::fs::write(&path, document.text()).await?;
        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

pub struct DefaultWorkspaceService {
    root: PathBuf,
    config: FixforgeConfig,
}

impl DefaultWorkspaceService {
    pub fn new(root: &Path, config: &FixforgeConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config: config.clone(),
        }
    }

    fn project_name(&self, root: &Path) -> String {
        self.config
            .project
            .name
            .clone()
            .or_else(|| {
                root.file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "unnamed".to_string())
    }

    fn discover(&self, root: &Path) -> Vec<PathBuf> {
        let filter = FileFilter::new(FileFilterConfig {
            root: root.to_path_buf(),
            respect_gitignore: self.config.workspace.respect_gitignore,
            ignored_paths: self.config.project.ignored_paths.clone(),
            include_hidden: false,
        });
        let extensions: Vec<&str> = self
            .config
            .project
            .extensions
            .iter()
            .map(String::as_str)
            .collect();
        filter.discover_files(&extensions)
    }

    async fn read_source(&self, path: &Path) -> Result<String, WorkspaceError> {
        let limit = crate::services::max_file_size_bytes();
        let size = tokio::fs::metadata(path).await?.len();
        if size > limit {
            return Err(WorkspaceError::FileTooLarge {
                path: path.display().to_string(),
                size_mb: size / (1024 * 1024),
                limit_mb: limit / (1024 * 1024),
            });
        }
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

#[async_trait]
impl WorkspaceService for DefaultWorkspaceService {
    async fn load(&self) -> Result<Workspace, WorkspaceError> {
        let root = tokio::fs::canonicalize(&self.root).await?;
        let files = self.discover(&root);
        if files.is_empty() {
            return Err(WorkspaceError::NoSourceFiles(root));
        }

        let parser = CSharpParser::new()?;
        let mut project = Project::new(self.project_name(&root));

        for path in &files {
            let source = match self.read_source(path).await {
                Ok(source) => source,
                Err(WorkspaceError::FileTooLarge { path, size_mb, limit_mb }) => {
                    tracing::warn!("Skipping {} ({}MB > {}MB)", path, size_mb, limit_mb);
                    continue;
                }
                Err(WorkspaceError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::warn!("Skipping non-UTF-8 file {}", path.display());
                    continue;
                }
                Err(e) => return Err(e),
            };

            let relative = path.strip_prefix(&root).unwrap_or(path).to_path_buf();
            let tree = parser.parse(&relative, &source)?;
            project = project.with_new_document(relative, tree).0;
        }

        tracing::debug!(
            "Loaded {} document(s) from {}",
            project.documents().count(),
            root.display()
        );

        let id = project.id();
        Ok(Workspace {
            root,
            project: id,
            solution: Solution::new().with_project(project),
        })
    }
}
