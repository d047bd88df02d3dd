use crate::classify::PageDisposition;
use crate::error::ScanWarning;
use crate::watermark::WatermarkArea;

/// Scan and cleaning outcome for one page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageReport {
    /// Page index (0-based) in the document as it was loaded.
    pub index: usize,
    pub disposition: PageDisposition,
    /// Extracted text length used for the decision.
    pub text_len: usize,
    /// Whether the page references at least one raster image.
    pub has_image: bool,
    /// Watermarked areas found on the page.
    pub areas: Vec<WatermarkArea>,
    /// Link annotations removed from the page.
    pub links_removed: usize,
}

/// Summary of one cleaning pass over a document.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CleanReport {
    pub pages: Vec<PageReport>,
    /// Removed page indices in original numbering, ascending.
    pub removed: Vec<usize>,
    pub warnings: Vec<ScanWarning>,
}

impl CleanReport {
    /// Number of pages scanned.
    pub fn pages_scanned(&self) -> usize {
        self.pages.len()
    }

    /// Total watermark areas across all pages.
    pub fn areas_found(&self) -> usize {
        self.pages.iter().map(|p| p.areas.len()).sum()
    }

    /// Number of redacted pages.
    pub fn pages_redacted(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.disposition == PageDisposition::Redact)
            .count()
    }

    /// Total link annotations removed.
    pub fn links_removed(&self) -> usize {
        self.pages.iter().map(|p| p.links_removed).sum()
    }

    /// True if the pass found nothing to do.
    pub fn is_untouched(&self) -> bool {
        self.removed.is_empty() && self.areas_found() == 0 && self.links_removed() == 0
    }
}
