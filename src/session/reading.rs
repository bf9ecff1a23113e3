//! The open reading session

use std::sync::Arc;

use image::RgbaImage;

use crate::bookmarks::Bookmark;
use crate::document::Document;
use crate::error::{ReaderError, Result};
use crate::render::{CacheStats, DocumentHandle, PageCache, RenderCanceller, RenderDispatcher};

use super::engine::ReadingEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opening,
    Open,
}

/// A page as shown to the reader
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page: usize,
    pub zoom: f32,
    pub night_mode: bool,
    pub image: Arc<RgbaImage>,
    /// Set when the page rendered but its progress could not be saved
    pub save_error: Option<Arc<ReaderError>>,
}

/// One user reading one document
///
/// Owns the document handle exclusively. Dropping an open session releases
/// the handle and schedules a progress checkpoint on the current runtime.
pub struct ReadingSession {
    engine: ReadingEngine,
    user_id: String,
    document: Document,
    handle: Option<Arc<dyn DocumentHandle>>,
    state: SessionState,
    current_page: usize,
    zoom: f32,
    night_mode: bool,
    cache: PageCache,
    dispatcher: RenderDispatcher,
    bookmarks: Vec<Bookmark>,
}

impl ReadingSession {
    pub(super) fn new(
        engine: ReadingEngine,
        user_id: String,
        document: Document,
        handle: Arc<dyn DocumentHandle>,
        current_page: usize,
        bookmarks: Vec<Bookmark>,
    ) -> Self {
        let config = engine.config();
        let zoom = config.zoom.clamp(config.zoom.default);
        let dispatcher = RenderDispatcher::new(config.render.timeout_secs);

        Self {
            engine,
            user_id,
            document,
            handle: Some(handle),
            state: SessionState::Open,
            current_page,
            zoom,
            night_mode: false,
            cache: PageCache::new(),
            dispatcher,
            bookmarks,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn night_mode(&self) -> bool {
        self.night_mode
    }

    /// Fraction of the document reached, in `[0, 1]`
    pub fn progress_fraction(&self) -> f32 {
        if self.document.total_pages == 0 {
            return 0.0;
        }
        self.current_page as f32 / self.document.total_pages as f32
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Handle for cancelling an in-flight render from another task
    pub fn canceller(&self) -> RenderCanceller {
        self.dispatcher.canceller()
    }

    fn open_handle(&self) -> Result<Arc<dyn DocumentHandle>> {
        match (&self.state, &self.handle) {
            (SessionState::Open, Some(handle)) => Ok(Arc::clone(handle)),
            _ => Err(ReaderError::SessionClosed),
        }
    }

    async fn render(&mut self, page: usize) -> Result<Arc<RgbaImage>> {
        let handle = self.open_handle()?;
        let zoom = self.zoom;
        let dispatcher = &self.dispatcher;
        self.cache
            .lookup_or_render(page, zoom, self.night_mode, || dispatcher.render(handle, page, zoom))
            .await
    }

    fn rendered(&self, image: Arc<RgbaImage>, save_error: Option<ReaderError>) -> RenderedPage {
        RenderedPage {
            page: self.current_page,
            zoom: self.zoom,
            night_mode: self.night_mode,
            image,
            save_error: save_error.map(Arc::new),
        }
    }

    /// Navigate to a 1-based page
    ///
    /// The page only becomes current once it rendered. A failed progress
    /// write does not fail navigation; it is reported on the result.
    pub async fn go_to_page(&mut self, page: usize) -> Result<RenderedPage> {
        self.open_handle()?;
        if !self.document.contains_page(page) {
            return Err(ReaderError::InvalidPage {
                page,
                total_pages: self.document.total_pages,
            });
        }

        let image = self.render(page).await?;
        self.current_page = page;

        let save_error = match self
            .engine
            .progress()
            .set(&self.user_id, &self.document.id, page)
            .await
        {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Navigated to page {} but {}", page, e);
                Some(e)
            }
        };

        Ok(self.rendered(image, save_error))
    }

    pub async fn next_page(&mut self) -> Result<RenderedPage> {
        self.go_to_page(self.current_page + 1).await
    }

    pub async fn previous_page(&mut self) -> Result<RenderedPage> {
        self.go_to_page(self.current_page.saturating_sub(1)).await
    }

    /// Render the current page with the current settings
    pub async fn render_current(&mut self) -> Result<RenderedPage> {
        let image = self.render(self.current_page).await?;
        Ok(self.rendered(image, None))
    }

    /// Change zoom, clamped and snapped to the configured range
    pub async fn set_zoom(&mut self, zoom: f32) -> Result<RenderedPage> {
        self.open_handle()?;
        self.zoom = self.engine.config().zoom.clamp(zoom);
        self.cache.invalidate();
        tracing::debug!("Zoom set to {} for {}", self.zoom, self.document.id);
        self.render_current().await
    }

    pub async fn zoom_in(&mut self) -> Result<RenderedPage> {
        let step = self.engine.config().zoom.step;
        self.set_zoom(self.zoom + step).await
    }

    pub async fn zoom_out(&mut self) -> Result<RenderedPage> {
        let step = self.engine.config().zoom.step;
        self.set_zoom(self.zoom - step).await
    }

    pub async fn toggle_night_mode(&mut self) -> Result<RenderedPage> {
        self.open_handle()?;
        self.night_mode = !self.night_mode;
        self.cache.invalidate();
        tracing::debug!("Night mode {} for {}", if self.night_mode { "on" } else { "off" }, self.document.id);
        self.render_current().await
    }

    /// Bookmarks loaded for this session, ascending by page
    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn bookmark_count(&self) -> usize {
        self.bookmarks.len()
    }

    /// Bookmark a page; any page number is accepted
    pub async fn add_bookmark(&mut self, page: usize, description: Option<&str>) -> Result<Bookmark> {
        self.open_handle()?;
        let bookmark = self
            .engine
            .bookmarks()
            .add(&self.user_id, &self.document.id, page, description)
            .await?;
        self.bookmarks.push(bookmark.clone());
        self.bookmarks.sort_by_key(|b| b.page);
        Ok(bookmark)
    }

    /// Reload bookmarks from storage
    pub async fn list_bookmarks(&mut self) -> Result<Vec<Bookmark>> {
        self.open_handle()?;
        self.bookmarks = self
            .engine
            .bookmarks()
            .list(&self.user_id, &self.document.id)
            .await;
        Ok(self.bookmarks.clone())
    }

    pub async fn remove_bookmark(&mut self, id: &str) -> Result<()> {
        self.open_handle()?;
        self.engine.remove_bookmark(id).await?;
        self.bookmarks.retain(|b| b.id != id);
        Ok(())
    }

    pub async fn remove_all_bookmarks(&mut self) -> Result<usize> {
        self.open_handle()?;
        let removed = self
            .engine
            .bookmarks()
            .remove_all(&self.user_id, &self.document.id)
            .await?;
        self.bookmarks.clear();
        Ok(removed)
    }

    /// Save final progress and release the document handle
    ///
    /// The handle is released even when the save fails. Closing a closed
    /// session does nothing.
    pub async fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        self.handle.take();
        self.cache.invalidate();
        self.dispatcher.canceller().cancel();
        self.state = SessionState::Closed;

        let saved = self
            .engine
            .progress()
            .set(&self.user_id, &self.document.id, self.current_page)
            .await;

        tracing::info!(
            "Closed \"{}\" for {} at page {}",
            self.document.title,
            self.user_id,
            self.current_page
        );
        saved
    }

    /// Close this document and open another for the same user
    ///
    /// Forces a progress checkpoint on the current document. If the new
    /// document cannot be opened the session stays closed.
    pub async fn switch_document(&mut self, document_id: &str) -> Result<()> {
        if let Err(e) = self.close().await {
            tracing::warn!("Switching away from {} without saved progress: {}", self.document.id, e);
        }

        self.state = SessionState::Opening;
        match self.engine.open(&self.user_id, document_id).await {
            Ok(next) => {
                tracing::info!("Switched from {} to {}", self.document.id, document_id);
                *self = next;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Closed;
                Err(e)
            }
        }
    }
}

impl Drop for ReadingSession {
    fn drop(&mut self) {
        if self.state != SessionState::Open {
            return;
        }

        self.handle.take();
        self.state = SessionState::Closed;

        let progress = self.engine.progress().clone();
        let user_id = self.user_id.clone();
        let document_id = self.document.id.clone();
        let page = self.current_page;

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::warn!("Session for {} dropped while open, saving page {}", document_id, page);
                runtime.spawn(async move {
                    if let Err(e) = progress.set(&user_id, &document_id, page).await {
                        tracing::warn!("Progress checkpoint on drop failed: {}", e);
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    "Session for {} dropped outside a runtime, page {} not saved",
                    document_id,
                    page
                );
            }
        }
    }
}
