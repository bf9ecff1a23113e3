//! In-memory record store
//!
//! Keeps the collection in process. Counts writes and can be told to fail
//! loads or writes, which is how persistence failures are exercised.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::RecordStore;
use crate::error::{ReaderError, Result, StoreError};

pub struct MemoryRecordStore<T> {
    name: String,
    records: Mutex<Vec<T>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_loads: AtomicBool,
}

impl<T: Clone> MemoryRecordStore<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_records(name, Vec::new())
    }

    pub fn with_records(name: impl Into<String>, records: Vec<T>) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(records),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
            fail_loads: AtomicBool::new(false),
        }
    }

    /// Snapshot of the stored records
    pub fn records(&self) -> Vec<T> {
        self.records.lock().clone()
    }

    /// Number of successful `save_all` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl<T> RecordStore<T> for MemoryRecordStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn collection(&self) -> &str {
        &self.name
    }

    async fn try_load_all(&self) -> Result<Vec<T>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(ReaderError::DataLoadError {
                collection: self.name.clone(),
                reason: "injected load failure".to_string(),
            });
        }
        Ok(self.records.lock().clone())
    }

    async fn save_all(&self, records: &[T]) -> std::result::Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(format!("{} is read-only", self.name)));
        }
        *self.records.lock() = records.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
