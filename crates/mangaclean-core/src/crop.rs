//! Fit policies and dominant-image placement.
//!
//! Sizes are mixed on purpose: image dimensions are in pixels and page
//! dimensions in points, and the placement arithmetic treats one pixel as
//! one point. A 800×1440 image centered on a 1000×1500 page under
//! [`CropMode::FitWidth`] becomes 1000×1800 at `(0, -150)`.

use std::fmt;
use std::str::FromStr;

use crate::error::CleanError;

/// Fit policy for the image geometry pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum CropMode {
    /// Leave every page as it is.
    #[default]
    Skip,
    /// Scale so the image spans the page width.
    FitWidth,
    /// Scale so the image spans the page height.
    FitHeight,
    /// Fill the page exactly, ignoring aspect ratio.
    Stretch,
    /// Keep the image size, only recenter it.
    CenterOnly,
}

impl CropMode {
    /// All modes in menu order.
    pub const ALL: [CropMode; 5] = [
        CropMode::Skip,
        CropMode::FitWidth,
        CropMode::FitHeight,
        CropMode::Stretch,
        CropMode::CenterOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropMode::Skip => "skip",
            CropMode::FitWidth => "fit-width",
            CropMode::FitHeight => "fit-height",
            CropMode::Stretch => "stretch",
            CropMode::CenterOnly => "center-only",
        }
    }

    /// Short human description, used by interactive prompts.
    pub fn describe(&self) -> &'static str {
        match self {
            CropMode::Skip => "leave pages unchanged",
            CropMode::FitWidth => "scale image to the page width",
            CropMode::FitHeight => "scale image to the page height",
            CropMode::Stretch => "stretch image over the whole page",
            CropMode::CenterOnly => "keep image size, center it",
        }
    }
}

impl fmt::Display for CropMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropMode {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        CropMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| CleanError::InvalidInput(format!("unknown crop mode: {s}")))
    }
}

/// Pixel dimensions of an image XObject referenced by a page.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageInfo {
    /// Resource name under `/XObject` (e.g. `Im0`).
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageInfo {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// Pixel area.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Where and how large the dominant image is drawn, in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Pick the largest image whose area is strictly above `min_area`.
///
/// Ties go to the first image encountered.
pub fn select_dominant(images: &[ImageInfo], min_area: u64) -> Option<&ImageInfo> {
    let mut best: Option<&ImageInfo> = None;
    for image in images {
        let area = image.area();
        if area <= min_area {
            continue;
        }
        if best.is_none_or(|b| area > b.area()) {
            best = Some(image);
        }
    }
    best
}

/// Target geometry of an image under a fit policy, centered on the page.
///
/// Returns `None` for [`CropMode::Skip`] or a degenerate image. Offsets
/// may be negative when the image overflows the page.
pub fn compute_placement(
    mode: CropMode,
    page_width: f64,
    page_height: f64,
    image_width: f64,
    image_height: f64,
) -> Option<Placement> {
    if image_width <= 0.0 || image_height <= 0.0 {
        return None;
    }
    let (width, height) = match mode {
        CropMode::Skip => return None,
        CropMode::FitWidth => {
            let scale = page_width / image_width;
            (page_width, image_height * scale)
        }
        CropMode::FitHeight => {
            let scale = page_height / image_height;
            (image_width * scale, page_height)
        }
        CropMode::Stretch => (page_width, page_height),
        CropMode::CenterOnly => (image_width, image_height),
    };
    Some(Placement {
        x: (page_width - width) / 2.0,
        y: (page_height - height) / 2.0,
        width,
        height,
    })
}

/// True when the image's pixel width is below `ratio` of the page width.
pub fn is_underfilled(image_width: u32, page_width: f64, ratio: f64) -> bool {
    f64::from(image_width) < page_width * ratio
}
