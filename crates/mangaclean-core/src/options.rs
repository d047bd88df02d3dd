//! Tunable settings for the cleaning and resizing passes.
//!
//! Defaults reproduce the behavior the tool ships with; the thresholds are
//! load-bearing and covered by boundary tests.

use crate::text::RunOptions;

/// Watermark token searched for in PDF text runs and link URIs.
pub const WATERMARK_TOKEN: &str = "oceanofpdf";

/// Watermark token searched for in EPUB HTML resources.
pub const EPUB_WATERMARK_TOKEN: &str = "oceanofpdf.com";

/// Pages with a watermark, no raster image, and fewer extracted characters
/// than this are removed outright.
pub const MIN_CONTENT_CHARS: usize = 300;

/// Images must cover strictly more pixels than this to be considered
/// the dominant image of a page.
pub const MIN_DOMINANT_IMAGE_AREA: u64 = 50_000;

/// Options for the watermark scan / redact / prune pass.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// Lowercase token matched case-insensitively against run text (default: `"oceanofpdf"`).
    pub token: String,
    /// Text length below which a watermarked, image-free page is removed (default: 300).
    pub min_content_chars: usize,
    /// Distance the cover rectangle origin is shifted left and down (default: 2.0).
    pub cover_margin: f64,
    /// Amount added to each cover dimension (default: 6.0).
    pub cover_growth: f64,
    /// Maximum nesting depth for Form XObjects while scanning (default: 10).
    pub max_recursion_depth: usize,
    /// Maximum horizontal gap between glyphs of one run (default: 3.0).
    pub x_tolerance: f64,
    /// Maximum difference between glyph top edges within one run (default: 3.0).
    pub y_tolerance: f64,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            token: WATERMARK_TOKEN.to_string(),
            min_content_chars: MIN_CONTENT_CHARS,
            cover_margin: 2.0,
            cover_growth: 6.0,
            max_recursion_depth: 10,
            x_tolerance: 3.0,
            y_tolerance: 3.0,
        }
    }
}

impl CleanOptions {
    /// Run-grouping tolerances carried by these options.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            x_tolerance: self.x_tolerance,
            y_tolerance: self.y_tolerance,
        }
    }
}

/// Options for the image geometry pass.
#[derive(Debug, Clone)]
pub struct ResizeOptions {
    /// Pixel-area floor for dominant images; strictly greater is required (default: 50,000).
    pub min_image_area: u64,
    /// How many leading pages `needs_resizing` samples (default: 5).
    pub sample_pages: usize,
    /// An image narrower than this fraction of the page width counts as
    /// under-filled (default: 0.99).
    pub width_ratio: f64,
    /// Leave page 0 untouched as the cover page (default: true).
    pub keep_cover: bool,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            min_image_area: MIN_DOMINANT_IMAGE_AREA,
            sample_pages: 5,
            width_ratio: 0.99,
            keep_cover: true,
        }
    }
}
