//! Off-thread rendering with supersession
//!
//! Renders run on tokio's blocking pool under a timeout. Every request takes
//! a ticket; issuing a newer request, or calling [`RenderCanceller::cancel`],
//! makes older tickets stale. A stale request skips the render if it has not
//! started and discards the result if it has.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use tokio::time::{timeout, Duration};

use super::DocumentHandle;
use crate::error::{ReaderError, Result};

/// Cancels whatever render is in flight for a session
#[derive(Clone)]
pub struct RenderCanceller {
    latest: Arc<AtomicU64>,
}

impl RenderCanceller {
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct RenderDispatcher {
    latest: Arc<AtomicU64>,
    timeout_secs: u64,
}

impl RenderDispatcher {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            timeout_secs,
        }
    }

    pub fn canceller(&self) -> RenderCanceller {
        RenderCanceller {
            latest: Arc::clone(&self.latest),
        }
    }

    /// Render a page on the blocking pool
    pub async fn render(
        &self,
        handle: Arc<dyn DocumentHandle>,
        page: usize,
        zoom: f32,
    ) -> Result<RgbaImage> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);

        let task = tokio::task::spawn_blocking(move || {
            if latest.load(Ordering::SeqCst) != ticket {
                return Err(ReaderError::Cancelled { page });
            }
            let image = handle.render_page(page, zoom)?;
            if latest.load(Ordering::SeqCst) != ticket {
                return Err(ReaderError::Cancelled { page });
            }
            Ok(image)
        });

        match timeout(Duration::from_secs(self.timeout_secs), task).await {
            Ok(joined) => joined
                .map_err(|e| ReaderError::render(page, format!("Task join error: {}", e)))?,
            Err(_) => {
                self.latest.fetch_add(1, Ordering::SeqCst);
                Err(ReaderError::render(
                    page,
                    format!("timed out after {} seconds", self.timeout_secs),
                ))
            }
        }
    }
}
