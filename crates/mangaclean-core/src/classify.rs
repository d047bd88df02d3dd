//! Page disposition decisions.

use std::fmt;

/// What the cleaner does with a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PageDisposition {
    /// No watermark; the page is left untouched.
    Keep,
    /// Watermark present on a page with real content; scrub links and cover.
    Redact,
    /// Watermark present on a filler page; delete it.
    Remove,
}

impl fmt::Display for PageDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageDisposition::Keep => "keep",
            PageDisposition::Redact => "redact",
            PageDisposition::Remove => "remove",
        })
    }
}

/// Decide a page's disposition.
///
/// A watermarked page is removed only when it carries no raster image and
/// its extracted text is shorter than `min_content_chars`.
pub fn classify(
    watermark_found: bool,
    has_image: bool,
    text_len: usize,
    min_content_chars: usize,
) -> PageDisposition {
    if !watermark_found {
        PageDisposition::Keep
    } else if !has_image && text_len < min_content_chars {
        PageDisposition::Remove
    } else {
        PageDisposition::Redact
    }
}

/// Page indices to delete, highest first, without duplicates.
///
/// Deleting in this order never shifts an index that is still pending.
pub fn removal_order(indices: impl IntoIterator<Item = usize>) -> Vec<usize> {
    let mut order: Vec<usize> = indices.into_iter().collect();
    order.sort_unstable_by(|a, b| b.cmp(a));
    order.dedup();
    order
}
