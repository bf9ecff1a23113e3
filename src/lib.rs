//! Libros Reader
//!
//! Reading session engine: opens a paginated document for a user who holds
//! a loan on it, renders pages under a zoom factor with an optional night
//! mode, caches the last rendered page, and keeps reading progress and
//! bookmarks across sessions.
//!
//! # Modules
//!
//! - `session`: `ReadingEngine` and `ReadingSession`, the orchestrators
//! - `render`: document handles, the page cache and night mode
//! - `progress` / `bookmarks`: per-user persistence on top of `store`
//! - `access`: loan-based access gate
//! - `document`: catalog types and lookup

pub mod access;
pub mod bookmarks;
pub mod config;
pub mod document;
pub mod error;
pub mod progress;
pub mod render;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use access::{AccessGate, IdentityProvider, LoanFact, LoanLedger, LoanStatus, StaticIdentity};
pub use bookmarks::{Bookmark, BookmarkManager};
pub use config::Config;
pub use document::{Document, DocumentCatalog, DocumentFormat};
pub use error::{ReaderError, Result, StoreError};
pub use progress::{ProgressRecord, ProgressTracker};
pub use render::{DocumentHandle, DocumentLoader, MupdfLoader, RenderCanceller};
pub use session::{ReadingEngine, ReadingSession, RenderedPage, SessionState};
pub use store::{Library, RecordStore};
