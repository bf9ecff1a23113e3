//! Shared fixtures for unit tests

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use tempfile::TempDir;

use crate::access::{LoanFact, LoanStatus, RecordLoanLedger};
use crate::bookmarks::{Bookmark, BookmarkManager};
use crate::config::Config;
use crate::document::{Document, RecordCatalog};
use crate::error::{ReaderError, Result};
use crate::progress::{ProgressRecord, ProgressTracker};
use crate::render::{DocumentHandle, DocumentLoader, RenderCanceller};
use crate::session::ReadingEngine;
use crate::store::MemoryRecordStore;

pub fn pdf_document(id: &str, total_pages: usize) -> Document {
    Document {
        id: id.to_string(),
        title: format!("Title of {}", id),
        author: "Anonymous".to_string(),
        format: "pdf".to_string(),
        source_locator: format!("{}.pdf", id),
        total_pages,
        available: true,
    }
}

/// Handle that draws a flat colour per page and counts renders
pub struct FakeHandle {
    pages: usize,
    renders: AtomicUsize,
    failing: Mutex<HashSet<usize>>,
    slow: Mutex<Option<(usize, Duration)>>,
    canceller: Mutex<Option<RenderCanceller>>,
}

impl FakeHandle {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            renders: AtomicUsize::new(0),
            failing: Mutex::new(HashSet::new()),
            slow: Mutex::new(None),
            canceller: Mutex::new(None),
        }
    }

    pub fn width_at(zoom: f32) -> u32 {
        (10.0 * zoom).round() as u32
    }

    pub fn expected_image(page: usize, zoom: f32) -> RgbaImage {
        let side = Self::width_at(zoom);
        RgbaImage::from_pixel(side, side, Rgba([page as u8, 40, 200, 128]))
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn fail_page(&self, page: usize) {
        self.failing.lock().insert(page);
    }

    /// Block the rendering thread for `delay` whenever `page` is rendered
    pub fn slow_page(&self, page: usize, delay: Duration) {
        *self.slow.lock() = Some((page, delay));
    }

    /// Cancel the dispatcher from inside the next render
    pub fn cancel_while_rendering(&self, canceller: RenderCanceller) {
        *self.canceller.lock() = Some(canceller);
    }
}

impl DocumentHandle for FakeHandle {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(&self, page: usize, zoom: f32) -> Result<RgbaImage> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        if let Some(canceller) = self.canceller.lock().take() {
            canceller.cancel();
        }
        let delay = match *self.slow.lock() {
            Some((slow, delay)) if slow == page => Some(delay),
            _ => None,
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        if self.failing.lock().contains(&page) {
            return Err(ReaderError::render(page, "damaged page stream"));
        }
        Ok(Self::expected_image(page, zoom))
    }
}

/// Loader handing out one shared `FakeHandle` per document id
#[derive(Default)]
pub struct FakeLoader {
    handles: Mutex<Vec<(String, Arc<FakeHandle>)>>,
    loads: AtomicUsize,
}

impl FakeLoader {
    pub fn handle(&self, document_id: &str) -> Option<Arc<FakeHandle>> {
        self.handles
            .lock()
            .iter()
            .find(|(id, _)| id == document_id)
            .map(|(_, h)| Arc::clone(h))
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl DocumentLoader for FakeLoader {
    fn load(&self, document: &Document, _path: &Path) -> Result<Arc<dyn DocumentHandle>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let handle = match self.handle(&document.id) {
            Some(handle) => handle,
            None => {
                let handle = Arc::new(FakeHandle::new(document.total_pages));
                self.handles
                    .lock()
                    .push((document.id.clone(), Arc::clone(&handle)));
                handle
            }
        };
        Ok(handle)
    }
}

/// An engine over in-memory stores and a temp library directory
pub struct Fixture {
    pub engine: ReadingEngine,
    pub loader: Arc<FakeLoader>,
    pub documents: Arc<MemoryRecordStore<Document>>,
    pub progress: Arc<MemoryRecordStore<ProgressRecord>>,
    pub bookmarks: Arc<MemoryRecordStore<Bookmark>>,
    pub loans: Arc<MemoryRecordStore<LoanFact>>,
    pub library_dir: PathBuf,
    _dir: TempDir,
}

impl Fixture {
    /// `ana` holds an active loan on `doc-1` (50 pages) and `doc-2` (12 pages)
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let library_dir = dir.path().join("library");
        std::fs::create_dir_all(&library_dir).unwrap();

        let docs = vec![pdf_document("doc-1", 50), pdf_document("doc-2", 12)];
        for doc in &docs {
            std::fs::write(library_dir.join(&doc.source_locator), b"%PDF-1.7\n").unwrap();
        }

        let documents: Arc<MemoryRecordStore<Document>> =
            Arc::new(MemoryRecordStore::with_records("documents", docs));
        let progress: Arc<MemoryRecordStore<ProgressRecord>> =
            Arc::new(MemoryRecordStore::<ProgressRecord>::new("progress"));
        let bookmarks: Arc<MemoryRecordStore<Bookmark>> =
            Arc::new(MemoryRecordStore::<Bookmark>::new("bookmarks"));
        let loans: Arc<MemoryRecordStore<LoanFact>> = Arc::new(MemoryRecordStore::with_records(
            "loans",
            vec![
                LoanFact::new("ana", "doc-1", LoanStatus::Active),
                LoanFact::new("ana", "doc-2", LoanStatus::Active),
            ],
        ));
        let loader = Arc::new(FakeLoader::default());

        let mut config = Config::default();
        config.storage.data_dir = dir.path().to_path_buf();
        config.storage.library_dir = library_dir.clone();
        config.render.timeout_secs = 5;

        let engine = ReadingEngine::new(
            Arc::new(RecordCatalog::new(documents.clone())),
            Arc::new(RecordLoanLedger::new(loans.clone())),
            ProgressTracker::new(progress.clone()),
            BookmarkManager::new(bookmarks.clone()),
            loader.clone(),
            config,
        );

        Self {
            engine,
            loader,
            documents,
            progress,
            bookmarks,
            loans,
            library_dir,
            _dir: dir,
        }
    }
}
