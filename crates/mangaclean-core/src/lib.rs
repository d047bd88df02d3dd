//! mangaclean-core: Backend-independent data types and algorithms.
//!
//! This crate provides the foundational types (BBox, Glyph, TextRun,
//! WatermarkArea, CropMode, etc.) and the pure decisions (run grouping,
//! page classification, removal ordering, fit-policy placement) used by
//! mangaclean. It has no PDF library dependency.

pub mod classify;
pub mod crop;
pub mod error;
pub mod geometry;
pub mod options;
pub mod report;
pub mod text;
pub mod watermark;

pub use classify::{PageDisposition, classify, removal_order};
pub use crop::{CropMode, ImageInfo, Placement, compute_placement, is_underfilled, select_dominant};
pub use error::{CleanError, ScanWarning, Scanned, WarningCode};
pub use geometry::{BBox, Ctm, MediaBox, Point};
pub use options::{
    CleanOptions, EPUB_WATERMARK_TOKEN, MIN_CONTENT_CHARS, MIN_DOMINANT_IMAGE_AREA, ResizeOptions,
    WATERMARK_TOKEN,
};
pub use report::{CleanReport, PageReport};
pub use text::{Glyph, RunOptions, TextDirection, TextRun, group_runs, total_text_len};
pub use watermark::{
    CoverRect, WatermarkArea, contains_token, cover_rect, find_areas, is_covered,
};
