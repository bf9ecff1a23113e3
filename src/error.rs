//! Error types for the reading engine
//!
//! Every failure the engine can report is a variant of [`ReaderError`].
//! Persistence has its own [`StoreError`], which is carried as the source of
//! `SaveError` and `DataLoadError`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Engine-wide result type
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Kind of entity a `NotFound` refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Document,
    Bookmark,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Document => write!(f, "Document"),
            Entity::Bookmark => write!(f, "Bookmark"),
        }
    }
}

/// What a failed write was trying to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    Progress,
    Bookmark,
}

impl fmt::Display for SaveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveTarget::Progress => write!(f, "progress"),
            SaveTarget::Bookmark => write!(f, "bookmark"),
        }
    }
}

/// Reading engine error type
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    #[error("File for document {document_id} is missing: {}", .path.display())]
    FileMissing { document_id: String, path: PathBuf },

    #[error("User {user_id} has no active loan for document {document_id}")]
    AccessDenied { user_id: String, document_id: String },

    #[error("Document {document_id} has unsupported format: {format}")]
    UnsupportedFormat { document_id: String, format: String },

    #[error("Failed to load document {document_id}: {reason}")]
    LoadError { document_id: String, reason: String },

    #[error("Invalid page {page}: document has {total_pages} pages")]
    InvalidPage { page: usize, total_pages: usize },

    #[error("Failed to render page {page}: {reason}")]
    RenderError { page: usize, reason: String },

    #[error("Failed to save {target}: {source}")]
    SaveError {
        target: SaveTarget,
        #[source]
        source: StoreError,
    },

    #[error("Failed to load {collection}: {reason}")]
    DataLoadError { collection: String, reason: String },

    #[error("Render of page {page} was cancelled")]
    Cancelled { page: usize },

    #[error("Reading session is closed")]
    SessionClosed,
}

impl ReaderError {
    pub fn document_not_found(id: impl Into<String>) -> Self {
        ReaderError::NotFound {
            entity: Entity::Document,
            id: id.into(),
        }
    }

    pub fn bookmark_not_found(id: impl Into<String>) -> Self {
        ReaderError::NotFound {
            entity: Entity::Bookmark,
            id: id.into(),
        }
    }

    pub fn save(target: SaveTarget, source: StoreError) -> Self {
        ReaderError::SaveError { target, source }
    }

    pub fn render(page: usize, reason: impl Into<String>) -> Self {
        ReaderError::RenderError {
            page,
            reason: reason.into(),
        }
    }

    /// Whether an open session stays usable after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ReaderError::SaveError { .. }
                | ReaderError::RenderError { .. }
                | ReaderError::Cancelled { .. }
                | ReaderError::DataLoadError { .. }
                | ReaderError::InvalidPage { .. }
        )
    }
}

/// Record store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Write rejected: {0}")]
    Rejected(String),
}
