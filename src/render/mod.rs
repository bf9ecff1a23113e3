//! Page rendering
//!
//! ```text
//!   ReadingSession
//!        │ page, zoom, night mode
//!        ▼
//!   ┌───────────┐  hit   ┌──────────────────────┐
//!   │ PageCache │──────▶ │ Arc<RgbaImage>        │
//!   └───────────┘        └──────────────────────┘
//!        │ miss
//!        ▼
//!   RenderDispatcher ── spawn_blocking ──▶ DocumentHandle::render_page
//!        │
//!        ▼ night mode only
//!   night_mode::invert (never cached)
//! ```

mod cache;
mod dispatch;
mod mupdf;
pub mod night_mode;

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;

use crate::document::Document;
use crate::error::Result;

pub use cache::{CacheStats, PageCache};
pub use dispatch::{RenderCanceller, RenderDispatcher};
pub use self::mupdf::{MupdfHandle, MupdfLoader};

/// An open, page-addressable document
///
/// Calls are blocking and may be CPU or IO heavy; callers run them off the
/// async runtime.
pub trait DocumentHandle: Send + Sync {
    fn page_count(&self) -> usize;

    /// Render a 1-based page at the given zoom factor
    fn render_page(&self, page: usize, zoom: f32) -> Result<RgbaImage>;
}

/// Opens document handles from assets on disk
pub trait DocumentLoader: Send + Sync {
    fn load(&self, document: &Document, path: &Path) -> Result<Arc<dyn DocumentHandle>>;
}
