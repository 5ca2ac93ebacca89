//! Document, project and solution snapshots
//!
//! Every type here is a persistent value: "changing" a document produces a new
//! document with a bumped version, and a new solution that shares every other
//! document with the one it was derived from.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::syntax::{NodeId, SyntaxNode};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_PROJECT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentId(u64);

impl DocumentId {
    pub fn fresh() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProjectId(u64);

impl ProjectId {
    pub fn fresh() -> Self {
        Self(NEXT_PROJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    project: ProjectId,
    path: PathBuf,
    root: SyntaxNode,
    version: u64,
}

impl Document {
    pub fn new(id: DocumentId, project: ProjectId, path: impl Into<PathBuf>, root: SyntaxNode) -> Self {
        Self {
            id,
            project,
            path: path.into(),
            root,
            version: 0,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> String {
        self.root.text()
    }

    /// Same document identity with a new tree
    pub fn with_syntax_root(&self, root: SyntaxNode) -> Self {
        Self {
            id: self.id,
            project: self.project,
            path: self.path.clone(),
            root,
            version: self.version + 1,
        }
    }

    /// Byte offset of a 1-indexed line and column (column counted in characters)
    pub fn offset_at(&self, line: u32, column: u32) -> Option<usize> {
        offset_at(&self.text(), line, column)
    }

    /// 1-indexed line and column of a byte offset
    pub fn position_of(&self, offset: usize) -> (u32, u32) {
        position_of(&self.text(), offset)
    }
}

pub(crate) fn offset_at(text: &str, line: u32, column: u32) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }
    let mut line_start = 0;
    for _ in 1..line {
        line_start += text[line_start..].find('\n')? + 1;
    }
    let line_text = text[line_start..].split('\n').next().unwrap_or("");
    let mut chars = line_text.char_indices();
    let mut offset = line_text.len();
    for _ in 1..column {
        if chars.next().is_none() {
            return None;
        }
    }
    if let Some((index, _)) = chars.next() {
        offset = index;
    }
    Some(line_start + offset)
}

pub(crate) fn position_of(text: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(text.len());
    let before = &text[..offset];
    let line = before.matches('\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() as u32 + 1;
    (line, column)
}

#[derive(Debug, Clone)]
pub struct Project {
    id: ProjectId,
    name: String,
    documents: im::OrdMap<DocumentId, Document>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::fresh(),
            name: name.into(),
            documents: im::OrdMap::new(),
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Add a parsed file to the project, returning the new project and the document id
    pub fn with_new_document(&self, path: impl Into<PathBuf>, root: SyntaxNode) -> (Self, DocumentId) {
        let id = DocumentId::fresh();
        let document = Document::new(id, self.id, path, root);
        (self.with_document(document), id)
    }

    fn with_document(&self, document: Document) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            documents: self.documents.update(document.id(), document),
        }
    }
}

/// The full set of documents visible to a transformation
#[derive(Debug, Clone, Default)]
pub struct Solution {
    projects: im::OrdMap<ProjectId, Project>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(&self, project: Project) -> Self {
        Self {
            projects: self.projects.update(project.id(), project),
        }
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(&id)
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.projects.values().flat_map(Project::documents)
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents().find(|d| d.id() == id)
    }

    pub fn document_by_path(&self, path: &Path) -> Option<&Document> {
        self.documents().find(|d| d.path() == path)
    }

    /// Document whose current tree contains the node
    pub fn document_owning(&self, node: NodeId) -> Option<&Document> {
        self.documents().find(|d| d.root().contains(node))
    }

    /// Replace one document; every other document is shared by identity.
    ///
    /// The document's project must already be part of the solution.
    pub fn with_document(&self, document: Document) -> Option<Self> {
        let project = self.projects.get(&document.project())?;
        Some(self.with_project(project.with_document(document)))
    }

    /// Documents whose tree differs from the same document in `base`
    pub fn changed_documents(&self, base: &Solution) -> Vec<DocumentId> {
        self.documents()
            .filter(|doc| {
                base.document(doc.id()).is_none_or(|old| {
                    old.version() != doc.version() || !old.root().ptr_eq(doc.root())
                })
            })
            .map(Document::id)
            .collect()
    }
}
