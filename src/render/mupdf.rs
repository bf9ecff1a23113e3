//! MuPDF-backed document handle
//!
//! MuPDF documents are not thread-safe. The handle keeps only the asset
//! path and page count, opens a fresh `mupdf::Document` for each render and
//! serializes renders through a mutex.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use mupdf::{Colorspace, Matrix};
use parking_lot::Mutex;

use super::{DocumentHandle, DocumentLoader};
use crate::document::{Document, DocumentFormat};
use crate::error::{ReaderError, Result};

pub struct MupdfHandle {
    path: PathBuf,
    page_count: usize,
    lock: Mutex<()>,
}

impl MupdfHandle {
    /// Open and validate a PDF on disk
    pub fn open(path: impl AsRef<Path>) -> std::result::Result<Self, mupdf::Error> {
        let path = path.as_ref().to_path_buf();
        let doc = mupdf::Document::open(&*path.to_string_lossy())?;
        let page_count = doc.page_count()? as usize;

        Ok(Self {
            path,
            page_count,
            lock: Mutex::new(()),
        })
    }

    /// Run a closure against a freshly opened document
    fn with_doc<F, R>(&self, f: F) -> std::result::Result<R, mupdf::Error>
    where
        F: FnOnce(&mupdf::Document) -> std::result::Result<R, mupdf::Error>,
    {
        let _guard = self.lock.lock();
        let doc = mupdf::Document::open(&*self.path.to_string_lossy())?;
        f(&doc)
    }
}

impl DocumentHandle for MupdfHandle {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&self, page: usize, zoom: f32) -> Result<RgbaImage> {
        if page == 0 || page > self.page_count {
            return Err(ReaderError::render(
                page,
                format!("file has {} pages", self.page_count),
            ));
        }

        let (width, height, rgba) = self
            .with_doc(|doc| {
                let mupdf_page = doc.load_page((page - 1) as i32)?;
                let matrix = Matrix::new_scale(zoom, zoom);
                let pixmap = mupdf_page.to_pixmap(&matrix, &Colorspace::device_rgb(), true, true)?;
                Ok(pixmap_to_rgba(&pixmap))
            })
            .map_err(|e| ReaderError::render(page, e.to_string()))?;

        RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| ReaderError::render(page, "Failed to create image buffer"))
    }
}

/// Expand pixmap samples to tightly packed RGBA
fn pixmap_to_rgba(pixmap: &mupdf::Pixmap) -> (u32, u32, Vec<u8>) {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            let a = if n >= 4 {
                samples.get(offset + 3).copied().unwrap_or(255)
            } else {
                255
            };
            rgba.extend_from_slice(&[r, g, b, a]);
        }
    }

    (width, height, rgba)
}

/// Loads PDFs through MuPDF
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfLoader;

impl MupdfLoader {
    fn sniff(path: &Path) -> std::io::Result<Option<DocumentFormat>> {
        let mut header = [0u8; 64];
        let read = File::open(path)?.read(&mut header)?;
        Ok(DocumentFormat::from_magic_bytes(&header[..read]))
    }
}

impl DocumentLoader for MupdfLoader {
    fn load(&self, document: &Document, path: &Path) -> Result<Arc<dyn DocumentHandle>> {
        let detected = Self::sniff(path).map_err(|e| ReaderError::LoadError {
            document_id: document.id.clone(),
            reason: e.to_string(),
        })?;
        if detected != Some(DocumentFormat::SUPPORTED) {
            return Err(ReaderError::UnsupportedFormat {
                document_id: document.id.clone(),
                format: detected
                    .map(|f| f.mime().to_string())
                    .unwrap_or_else(|| "unrecognised content".to_string()),
            });
        }

        let handle = MupdfHandle::open(path).map_err(|e| ReaderError::LoadError {
            document_id: document.id.clone(),
            reason: e.to_string(),
        })?;

        if handle.page_count() != document.total_pages {
            tracing::warn!(
                "Document {} lists {} pages but the file has {}",
                document.id,
                document.total_pages,
                handle.page_count()
            );
        }

        Ok(Arc::new(handle))
    }
}
