//! Session factory and shared collaborators

use std::sync::Arc;

use crate::access::{AccessGate, LoanLedger, RecordLoanLedger};
use crate::bookmarks::BookmarkManager;
use crate::config::Config;
use crate::document::{Document, DocumentCatalog, RecordCatalog};
use crate::error::{ReaderError, Result};
use crate::progress::ProgressTracker;
use crate::render::{DocumentHandle, DocumentLoader};
use crate::store::Library;

use super::reading::ReadingSession;

/// Opens reading sessions
#[derive(Clone)]
pub struct ReadingEngine {
    inner: Arc<EngineInner>,
}

pub(super) struct EngineInner {
    pub catalog: Arc<dyn DocumentCatalog>,
    pub gate: AccessGate,
    pub progress: ProgressTracker,
    pub bookmarks: BookmarkManager,
    pub loader: Arc<dyn DocumentLoader>,
    pub config: Config,
}

impl ReadingEngine {
    pub fn new(
        catalog: Arc<dyn DocumentCatalog>,
        ledger: Arc<dyn LoanLedger>,
        progress: ProgressTracker,
        bookmarks: BookmarkManager,
        loader: Arc<dyn DocumentLoader>,
        config: Config,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                catalog,
                gate: AccessGate::new(ledger),
                progress,
                bookmarks,
                loader,
                config,
            }),
        }
    }

    /// Engine over the record collections of a library
    pub fn from_library(library: &Library, loader: Arc<dyn DocumentLoader>, config: Config) -> Self {
        Self::new(
            Arc::new(RecordCatalog::new(library.documents.clone())),
            Arc::new(RecordLoanLedger::new(library.loans.clone())),
            ProgressTracker::new(library.progress.clone()),
            BookmarkManager::new(library.bookmarks.clone()),
            loader,
            config,
        )
    }

    pub(super) fn inner(&self) -> &EngineInner {
        &self.inner
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.inner.progress
    }

    pub fn bookmarks(&self) -> &BookmarkManager {
        &self.inner.bookmarks
    }

    /// Open a document for reading
    ///
    /// Checks run in order and fail before anything is loaded: unknown
    /// document, unsupported format, missing asset, no active loan. The
    /// session resumes at the stored page, or page 1.
    pub async fn open(&self, user_id: &str, document_id: &str) -> Result<ReadingSession> {
        tracing::debug!("Opening document {} for user {}", document_id, user_id);
        let inner = self.inner();

        let document = inner.catalog.get_document_by_id(document_id).await?;

        if !document
            .parsed_format()
            .map(|f| f.is_page_addressable())
            .unwrap_or(false)
        {
            return Err(ReaderError::UnsupportedFormat {
                document_id: document.id.clone(),
                format: document.format.clone(),
            });
        }

        let path = document.resolve_path(&inner.config.storage.library_dir);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ReaderError::FileMissing {
                document_id: document.id.clone(),
                path,
            });
        }

        if !inner.gate.can_read(user_id, &document.id).await {
            return Err(ReaderError::AccessDenied {
                user_id: user_id.to_string(),
                document_id: document.id.clone(),
            });
        }

        let handle = self.load_handle(&document, path).await?;

        let resume_page = match inner.progress.get(user_id, &document.id).await {
            Some(page) if document.contains_page(page) => page,
            Some(page) => {
                tracing::warn!(
                    "Stored page {} is outside document {} ({} pages), starting at page 1",
                    page,
                    document.id,
                    document.total_pages
                );
                1
            }
            None => 1,
        };

        let bookmarks = inner.bookmarks.list(user_id, &document.id).await;

        tracing::info!(
            "Opened \"{}\" for {} at page {} ({} bookmarks)",
            document.title,
            user_id,
            resume_page,
            bookmarks.len()
        );

        Ok(ReadingSession::new(
            self.clone(),
            user_id.to_string(),
            document,
            handle,
            resume_page,
            bookmarks,
        ))
    }

    /// Delete a bookmark by id
    pub async fn remove_bookmark(&self, id: &str) -> Result<()> {
        self.inner.bookmarks.remove_one(id).await
    }

    async fn load_handle(
        &self,
        document: &Document,
        path: std::path::PathBuf,
    ) -> Result<Arc<dyn DocumentHandle>> {
        let loader = Arc::clone(&self.inner.loader);
        let doc = document.clone();

        tokio::task::spawn_blocking(move || loader.load(&doc, &path))
            .await
            .map_err(|e| ReaderError::LoadError {
                document_id: document.id.clone(),
                reason: format!("Task join error: {}", e),
            })?
    }
}
