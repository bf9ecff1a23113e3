//! Catalog document types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Epub,
}

impl DocumentFormat {
    /// The one page-addressable format the engine can open
    pub const SUPPORTED: DocumentFormat = DocumentFormat::Pdf;

    /// Parse a stored format name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "epub" => Some(Self::Epub),
            _ => None,
        }
    }

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::from_name(ext)
    }

    /// Detect format from magic bytes
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }

        // ZIP container whose first entry is the epub mimetype
        if bytes.starts_with(b"PK") && bytes.len() > 30 {
            if let Ok(s) = std::str::from_utf8(&bytes[..bytes.len().min(58)]) {
                if s.contains("epub") {
                    return Some(Self::Epub);
                }
            }
        }

        None
    }

    pub fn is_page_addressable(self) -> bool {
        self == Self::SUPPORTED
    }

    pub fn mime(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Epub => "application/epub+zip",
        }
    }
}

/// A catalog entry
///
/// Everything except `available` is fixed once the document is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Stored format name, e.g. "pdf"
    pub format: String,
    /// Path to the asset, absolute or relative to the library directory
    pub source_locator: String,
    pub total_pages: usize,
    pub available: bool,
}

impl Document {
    /// Parsed format, `None` for names the engine does not know
    pub fn parsed_format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_name(&self.format)
    }

    /// Resolve the asset path against the library directory
    pub fn resolve_path(&self, library_dir: &Path) -> PathBuf {
        let locator = Path::new(&self.source_locator);
        if locator.is_absolute() {
            locator.to_path_buf()
        } else {
            library_dir.join(locator)
        }
    }

    pub fn contains_page(&self, page: usize) -> bool {
        (1..=self.total_pages).contains(&page)
    }
}
