//! Document lookup

use async_trait::async_trait;

use super::types::Document;
use crate::error::{ReaderError, Result};
use crate::store::SharedStore;

/// Catalog contract consumed by the engine
#[async_trait]
pub trait DocumentCatalog: Send + Sync {
    /// Fails with `NotFound` when no document has this id
    async fn get_document_by_id(&self, id: &str) -> Result<Document>;
}

/// Catalog backed by the documents record collection
pub struct RecordCatalog {
    store: SharedStore<Document>,
}

impl RecordCatalog {
    pub fn new(store: SharedStore<Document>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DocumentCatalog for RecordCatalog {
    async fn get_document_by_id(&self, id: &str) -> Result<Document> {
        self.store
            .load_all()
            .await
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ReaderError::document_not_found(id))
    }
}
