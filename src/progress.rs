//! Reading progress persistence
//!
//! One record per (user, document) holding the last page read. Writes load
//! the whole collection, replace or append the matching record and save the
//! whole collection back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, Result, SaveTarget};
use crate::store::SharedStore;

/// Last-read page for a (user, document) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub user_id: String,
    pub document_id: String,
    pub current_page: usize,
    pub last_updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    fn is_for(&self, user_id: &str, document_id: &str) -> bool {
        self.user_id == user_id && self.document_id == document_id
    }
}

/// Progress repository
#[derive(Clone)]
pub struct ProgressTracker {
    store: SharedStore<ProgressRecord>,
}

impl ProgressTracker {
    pub fn new(store: SharedStore<ProgressRecord>) -> Self {
        Self { store }
    }

    /// Stored page, or `None` if the user never read this document
    pub async fn get(&self, user_id: &str, document_id: &str) -> Option<usize> {
        self.store
            .load_all()
            .await
            .iter()
            .find(|r| r.is_for(user_id, document_id))
            .map(|r| r.current_page)
    }

    /// Update or create progress for a document
    pub async fn set(&self, user_id: &str, document_id: &str, page: usize) -> Result<()> {
        let mut records = self.store.load_all().await;
        let now = Utc::now();

        match records.iter_mut().find(|r| r.is_for(user_id, document_id)) {
            Some(record) => {
                record.current_page = page;
                record.last_updated_at = now;
            }
            None => records.push(ProgressRecord {
                user_id: user_id.to_string(),
                document_id: document_id.to_string(),
                current_page: page,
                last_updated_at: now,
            }),
        }

        self.store
            .save_all(&records)
            .await
            .map_err(|e| ReaderError::save(SaveTarget::Progress, e))?;

        tracing::debug!("Progress for {} on {} set to page {}", user_id, document_id, page);
        Ok(())
    }

    /// All progress for a user, most recently read first
    pub async fn list_for_user(&self, user_id: &str) -> Vec<ProgressRecord> {
        let mut records: Vec<ProgressRecord> = self
            .store
            .load_all()
            .await
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        records.sort_by(|a, b| b.last_updated_at.cmp(&a.last_updated_at));
        records
    }

    /// Delete progress for a document, returning whether a record existed
    pub async fn remove(&self, user_id: &str, document_id: &str) -> Result<bool> {
        let mut records = self.store.load_all().await;
        let before = records.len();
        records.retain(|r| !r.is_for(user_id, document_id));
        if records.len() == before {
            return Ok(false);
        }

        self.store
            .save_all(&records)
            .await
            .map_err(|e| ReaderError::save(SaveTarget::Progress, e))?;
        Ok(true)
    }
}
