//! Bookmark persistence
//!
//! Bookmarks are user-created page markers. They are created and deleted
//! but never edited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ReaderError, Result, SaveTarget};
use crate::store::SharedStore;

const BOOKMARK_ID_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub document_id: String,
    pub page: usize,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    fn is_for(&self, user_id: &str, document_id: &str) -> bool {
        self.user_id == user_id && self.document_id == document_id
    }
}

pub fn default_description(page: usize) -> String {
    format!("Bookmark page {}", page)
}

/// Short token that no existing bookmark uses
fn generate_id(existing: &[Bookmark]) -> String {
    loop {
        let candidate: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(BOOKMARK_ID_LEN)
            .collect();
        if !existing.iter().any(|b| b.id == candidate) {
            return candidate;
        }
    }
}

/// Bookmark repository
#[derive(Clone)]
pub struct BookmarkManager {
    store: SharedStore<Bookmark>,
}

impl BookmarkManager {
    pub fn new(store: SharedStore<Bookmark>) -> Self {
        Self { store }
    }

    /// Create a bookmark
    ///
    /// Any page number is accepted; range checks belong to navigation. A
    /// blank description becomes "Bookmark page N". If the write fails the
    /// bookmark does not exist.
    pub async fn add(
        &self,
        user_id: &str,
        document_id: &str,
        page: usize,
        description: Option<&str>,
    ) -> Result<Bookmark> {
        let mut bookmarks = self.store.load_all().await;

        let description = match description.map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => default_description(page),
        };

        let bookmark = Bookmark {
            id: generate_id(&bookmarks),
            user_id: user_id.to_string(),
            document_id: document_id.to_string(),
            page,
            description,
            created_at: Utc::now(),
        };
        bookmarks.push(bookmark.clone());

        self.store
            .save_all(&bookmarks)
            .await
            .map_err(|e| ReaderError::save(SaveTarget::Bookmark, e))?;

        tracing::debug!("Added bookmark {} on page {} of {}", bookmark.id, page, document_id);
        Ok(bookmark)
    }

    /// Bookmarks for a document, ascending by page
    pub async fn list(&self, user_id: &str, document_id: &str) -> Vec<Bookmark> {
        let mut bookmarks: Vec<Bookmark> = self
            .store
            .load_all()
            .await
            .into_iter()
            .filter(|b| b.is_for(user_id, document_id))
            .collect();
        bookmarks.sort_by_key(|b| b.page);
        bookmarks
    }

    pub async fn count(&self, user_id: &str, document_id: &str) -> usize {
        self.list(user_id, document_id).await.len()
    }

    /// Delete the first bookmark with this id
    pub async fn remove_one(&self, id: &str) -> Result<()> {
        let mut bookmarks = self.store.load_all().await;
        let index = bookmarks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| ReaderError::bookmark_not_found(id))?;
        bookmarks.remove(index);

        self.store
            .save_all(&bookmarks)
            .await
            .map_err(|e| ReaderError::save(SaveTarget::Bookmark, e))
    }

    /// Delete every bookmark for a document, returning how many went
    pub async fn remove_all(&self, user_id: &str, document_id: &str) -> Result<usize> {
        let mut bookmarks = self.store.load_all().await;
        let before = bookmarks.len();
        bookmarks.retain(|b| !b.is_for(user_id, document_id));
        let removed = before - bookmarks.len();

        if removed > 0 {
            self.store
                .save_all(&bookmarks)
                .await
                .map_err(|e| ReaderError::save(SaveTarget::Bookmark, e))?;
        }
        Ok(removed)
    }
}
