//! JSON file record store
//!
//! One pretty-printed JSON array per collection. Saves write a sibling
//! temp file and rename it over the original, so readers never observe a
//! half-written collection.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RecordStore;
use crate::error::{ReaderError, Result, StoreError};

pub struct JsonRecordStore<T> {
    name: String,
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonRecordStore<T> {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            _records: PhantomData,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn load_error(&self, reason: impl ToString) -> ReaderError {
        ReaderError::DataLoadError {
            collection: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl<T> RecordStore<T> for JsonRecordStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn collection(&self) -> &str {
        &self.name
    }

    async fn try_load_all(&self) -> Result<Vec<T>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.load_error(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| self.load_error(e))
    }

    async fn save_all(&self, records: &[T]) -> std::result::Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(records)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &data).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::debug!("Saved {} {} records to {}", records.len(), self.name, self.path.display());
        Ok(())
    }
}
