//! Watermark matching and cover rectangle arithmetic.

use crate::geometry::{BBox, MediaBox};
use crate::text::TextRun;

/// Case-insensitive substring match of `token` in `text`.
///
/// `token` is expected in lowercase.
pub fn contains_token(text: &str, token: &str) -> bool {
    !token.is_empty() && text.to_lowercase().contains(token)
}

/// A region of a page where a watermarked run was found.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WatermarkArea {
    /// Run bounds in top-left origin coordinates.
    pub bbox: BBox,
    /// The matched run text.
    pub text: String,
}

impl WatermarkArea {
    pub fn from_run(run: &TextRun) -> Self {
        Self {
            bbox: run.bbox,
            text: run.text.clone(),
        }
    }
}

/// Flagged areas of a page: one per run whose text contains the token.
pub fn find_areas(runs: &[TextRun], token: &str) -> Vec<WatermarkArea> {
    runs.iter()
        .filter(|run| contains_token(&run.text, token))
        .map(WatermarkArea::from_run)
        .collect()
}

/// Whether `bbox` is fully hidden under one of the opaque `covers`.
pub fn is_covered(bbox: &BBox, covers: &[BBox]) -> bool {
    covers.iter().any(|cover| cover.contains(bbox))
}

/// An opaque fill rectangle in PDF user space (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Compute the cover rectangle for an area.
///
/// The origin moves `margin` left and down, each dimension grows by
/// `growth`, and the top-left area is flipped back into the content
/// stream's bottom-up space against the media box top.
pub fn cover_rect(area: &WatermarkArea, media_box: &MediaBox, margin: f64, growth: f64) -> CoverRect {
    let bbox = &area.bbox;
    CoverRect {
        x: bbox.x0 - margin,
        y: (media_box.y1 - bbox.bottom) - margin,
        width: bbox.width() + growth,
        height: bbox.height() + growth,
    }
}
