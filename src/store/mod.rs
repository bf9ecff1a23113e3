//! Record store
//!
//! Whole-collection persistence for the flat record sets the engine uses
//! (documents, progress, bookmarks, loan facts). A store loads every record
//! at once and overwrites every record at once; there is no partial write
//! and no locking, so two writers racing on the same collection end with
//! last-writer-wins.

mod json;
mod memory;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::access::LoanFact;
use crate::bookmarks::Bookmark;
use crate::document::Document;
use crate::error::{Result, StoreError};
use crate::progress::ProgressRecord;

pub use json::JsonRecordStore;
pub use memory::MemoryRecordStore;

/// Load-all / overwrite-all persistence for one collection
#[async_trait]
pub trait RecordStore<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Collection name used in logs and errors
    fn collection(&self) -> &str;

    /// Load every record, reporting unreadable data as `DataLoadError`
    async fn try_load_all(&self) -> Result<Vec<T>>;

    /// Replace the whole collection
    async fn save_all(&self, records: &[T]) -> std::result::Result<(), StoreError>;

    /// Load every record, treating unreadable data as an empty collection
    async fn load_all(&self) -> Vec<T> {
        match self.try_load_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("{}; continuing with an empty {} collection", e, self.collection());
                Vec::new()
            }
        }
    }
}

pub type SharedStore<T> = Arc<dyn RecordStore<T>>;

/// The four collections backing a reading engine
#[derive(Clone)]
pub struct Library {
    pub documents: SharedStore<Document>,
    pub progress: SharedStore<ProgressRecord>,
    pub bookmarks: SharedStore<Bookmark>,
    pub loans: SharedStore<LoanFact>,
}

impl Library {
    /// JSON-backed collections under `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            documents: Arc::new(JsonRecordStore::new("documents", dir.join("documents.json"))),
            progress: Arc::new(JsonRecordStore::new("progress", dir.join("progress.json"))),
            bookmarks: Arc::new(JsonRecordStore::new("bookmarks", dir.join("bookmarks.json"))),
            loans: Arc::new(JsonRecordStore::new("loans", dir.join("loans.json"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{LoanLedger, LoanStatus, RecordLoanLedger};
    use crate::bookmarks::BookmarkManager;
    use crate::document::{DocumentCatalog, RecordCatalog};
    use crate::progress::ProgressTracker;
    use crate::test_support::pdf_document;

    #[tokio::test]
    async fn test_library_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let first = Library::open(dir.path());
        first
            .documents
            .save_all(&[pdf_document("doc-1", 50)])
            .await
            .unwrap();
        first
            .loans
            .save_all(&[
                LoanFact::new("ana", "doc-1", LoanStatus::Active),
                LoanFact::new("ana", "doc-2", LoanStatus::Overdue),
            ])
            .await
            .unwrap();
        ProgressTracker::new(first.progress.clone())
            .set("ana", "doc-1", 10)
            .await
            .unwrap();
        let bookmark = BookmarkManager::new(first.bookmarks.clone())
            .add("ana", "doc-1", 12, Some("Chapter 3"))
            .await
            .unwrap();
        let written: Vec<ProgressRecord> = first.progress.try_load_all().await.unwrap();

        let second = Library::open(dir.path());

        let doc = RecordCatalog::new(second.documents.clone())
            .get_document_by_id("doc-1")
            .await
            .unwrap();
        assert_eq!(doc, pdf_document("doc-1", 50));

        let progress: Vec<ProgressRecord> = second.progress.try_load_all().await.unwrap();
        assert_eq!(progress, written);
        assert_eq!(progress[0].current_page, 10);

        let bookmarks = BookmarkManager::new(second.bookmarks.clone())
            .list("ana", "doc-1")
            .await;
        assert_eq!(bookmarks, vec![bookmark]);

        let loans: Vec<LoanFact> = second.loans.try_load_all().await.unwrap();
        assert_eq!(loans[1].status, LoanStatus::Overdue);
        let ledger = RecordLoanLedger::new(second.loans.clone());
        assert!(ledger.has_active_loan("ana", "doc-1").await);
        assert!(!ledger.has_active_loan("ana", "doc-2").await);

        let raw = std::fs::read_to_string(dir.path().join("loans.json")).unwrap();
        assert!(raw.contains("\"overdue\""));
    }
}
