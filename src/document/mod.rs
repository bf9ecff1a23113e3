//! Catalog documents
//!
//! The engine reads documents through the [`DocumentCatalog`] contract; the
//! catalog itself (search, pagination, editing) lives elsewhere.

mod catalog;
mod types;

pub use catalog::{DocumentCatalog, RecordCatalog};
pub use types::{Document, DocumentFormat};
