//! Top-level PDF document type.

use std::io::Write;
use std::path::Path;

use mangaclean_core::{CleanError, MediaBox, Scanned};
use mangaclean_parse::{LopdfDocument, XObjectImage};

/// A PDF document opened for cleaning.
///
/// Owns the parsed PDF for the whole pipeline: scanning, redaction,
/// pruning and resizing all go through the same `Document`, and nothing
/// reaches disk until [`Document::save_to`] is called.
///
/// # Example
///
/// ```ignore
/// let mut doc = Document::open_file("vol01.pdf")?;
/// let report = mangaclean::clean(&mut doc, &CleanOptions::default())?;
/// doc.save_to(&mut out)?;
/// ```
#[derive(Debug)]
pub struct Document {
    backend: LopdfDocument,
}

impl Document {
    /// Parse a PDF from memory.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError::Parse`] if the bytes are not a readable PDF,
    /// or [`CleanError::InvalidInput`] if the PDF is encrypted.
    pub fn open(bytes: &[u8]) -> Result<Self, CleanError> {
        Ok(Self {
            backend: LopdfDocument::open(bytes)?,
        })
    }

    /// Read and parse a PDF file.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, CleanError> {
        Ok(Self {
            backend: LopdfDocument::load(path)?,
        })
    }

    /// Wrap a document built in memory with lopdf.
    pub fn from_lopdf(doc: lopdf::Document) -> Result<Self, CleanError> {
        Ok(Self {
            backend: LopdfDocument::from_document(doc)?,
        })
    }

    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    /// Media box of a page.
    pub fn media_box(&self, index: usize) -> Result<MediaBox, CleanError> {
        Ok(self.backend.media_box(index)?)
    }

    /// Image XObjects in a page's resources.
    pub fn page_images(&self, index: usize) -> Result<Scanned<Vec<XObjectImage>>, CleanError> {
        Ok(self.backend.page_images(index)?)
    }

    /// Decoded content of a page.
    pub fn page_content(&self, index: usize) -> Result<Vec<u8>, CleanError> {
        Ok(self.backend.page_content(index)?)
    }

    /// The lopdf backend, for direct page queries.
    pub fn backend(&self) -> &LopdfDocument {
        &self.backend
    }

    pub(crate) fn backend_mut(&mut self) -> &mut LopdfDocument {
        &mut self.backend
    }

    /// Serialize the document.
    pub fn save_to<W: Write>(&mut self, writer: &mut W) -> Result<(), CleanError> {
        Ok(self.backend.save_to(writer)?)
    }

    /// Serialize the document into a byte vector.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, CleanError> {
        let mut bytes = Vec::new();
        self.save_to(&mut bytes)?;
        Ok(bytes)
    }
}
