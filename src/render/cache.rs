//! Single-slot rendered page cache
//!
//! Holds the most recently rendered (page, zoom) image. Normal page-by-page
//! reading asks for the same page repeatedly (redraws, zoom round trips)
//! and this slot absorbs those. Night-mode renders are inverted on the way
//! out and never stored, so the slot only ever holds unmodified renders.

use std::future::Future;
use std::sync::Arc;

use image::RgbaImage;

use super::night_mode;
use crate::error::Result;

/// Zoom as an integer key, zoom * 100
fn zoom_key(zoom: f32) -> u32 {
    (zoom * 100.0).round() as u32
}

struct CacheEntry {
    page: usize,
    zoom: u32,
    image: Arc<RgbaImage>,
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

#[derive(Default)]
pub struct PageCache {
    slot: Option<CacheEntry>,
    stats: CacheStats,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached image for exactly this page and zoom
    pub fn get(&self, page: usize, zoom: f32) -> Option<Arc<RgbaImage>> {
        self.slot
            .as_ref()
            .filter(|e| e.page == page && e.zoom == zoom_key(zoom))
            .map(|e| Arc::clone(&e.image))
    }

    /// Page and zoom key of the cached entry, if any
    pub fn cached_key(&self) -> Option<(usize, u32)> {
        self.slot.as_ref().map(|e| (e.page, e.zoom))
    }

    /// Drop the cached entry
    pub fn invalidate(&mut self) {
        if self.slot.take().is_some() {
            self.stats.invalidations += 1;
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Return the cached image or render a fresh one
    ///
    /// With night mode off a matching entry is returned as is; a miss is
    /// rendered and replaces the entry. With night mode on the page is
    /// always rendered, inverted and returned without touching the entry.
    pub async fn lookup_or_render<F, Fut>(
        &mut self,
        page: usize,
        zoom: f32,
        night_mode: bool,
        render: F,
    ) -> Result<Arc<RgbaImage>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RgbaImage>>,
    {
        if !night_mode {
            if let Some(image) = self.get(page, zoom) {
                self.stats.hits += 1;
                tracing::debug!("Page cache hit for page {} at zoom {}", page, zoom);
                return Ok(image);
            }
        }

        self.stats.misses += 1;
        tracing::debug!("Page cache miss for page {} at zoom {}", page, zoom);
        let image = render().await?;

        if night_mode {
            return Ok(Arc::new(night_mode::invert(&image)));
        }

        let image = Arc::new(image);
        self.slot = Some(CacheEntry {
            page,
            zoom: zoom_key(zoom),
            image: Arc::clone(&image),
        });
        Ok(image)
    }
}
