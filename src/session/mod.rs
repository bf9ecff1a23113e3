//! Reading sessions
//!
//! A [`ReadingEngine`] validates and opens documents; each successful open
//! yields a [`ReadingSession`] that owns the document handle, the page
//! cache and the current page, zoom and night-mode state.
//!
//! # Usage
//!
//! ```rust,ignore
//! use libros_reader::{Config, Library, MupdfLoader, ReadingEngine};
//!
//! let config = Config::from_env();
//! let library = Library::open(&config.storage.data_dir);
//! let engine = ReadingEngine::from_library(&library, Arc::new(MupdfLoader), config);
//!
//! let mut session = engine.open("ana", "doc-1").await?;
//! let page = session.go_to_page(10).await?;
//! session.close().await?;
//! ```

mod engine;
mod reading;

pub use engine::ReadingEngine;
pub use reading::{ReadingSession, RenderedPage, SessionState};
