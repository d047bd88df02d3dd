use crate::geometry::BBox;

/// Writing direction of a glyph, taken from the dominant axis of its
/// text rendering matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextDirection {
    /// Left-to-right, the upright default.
    #[default]
    Ltr,
    /// Right-to-left (mirrored or 180° rotated text).
    Rtl,
    /// Top-to-bottom (rotated 90° clockwise).
    Ttb,
    /// Bottom-to-top (rotated 90° counter-clockwise).
    Btt,
}

impl TextDirection {
    /// Direction of text drawn with the rendering matrix `[a b c d e f]`.
    pub fn from_matrix(a: f64, b: f64) -> Self {
        if a.abs() >= b.abs() {
            if a >= 0.0 { Self::Ltr } else { Self::Rtl }
        } else if b > 0.0 {
            Self::Btt
        } else {
            Self::Ttb
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Ttb | Self::Btt)
    }
}

/// A single glyph placed on a page by a text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Decoded text of the glyph (usually one character).
    pub text: String,
    /// Bounding box in top-left origin coordinates.
    pub bbox: BBox,
    /// Font resource name the glyph was shown with.
    pub fontname: String,
    /// Effective font size in points.
    pub size: f64,
    /// Writing direction.
    pub direction: TextDirection,
}

impl Glyph {
    /// Returns true if the glyph decodes to whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// Options for run grouping.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Maximum gap between adjacent glyph boxes along the writing
    /// direction of horizontal text, and maximum x0 drift across vertical text.
    pub x_tolerance: f64,
    /// Maximum top-edge drift across horizontal text, and maximum gap
    /// between adjacent glyph boxes along vertical text.
    pub y_tolerance: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
        }
    }
}

/// A contiguous run of glyphs, the unit watermark matching operates on.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Concatenated glyph text.
    pub text: String,
    /// Union of all glyph boxes.
    pub bbox: BBox,
    /// Number of glyphs in the run.
    pub glyph_count: usize,
    /// Direction of the first glyph.
    pub direction: TextDirection,
}

impl TextRun {
    /// Character count of the run text.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Groups glyphs into runs in content-stream order.
///
/// A whitespace glyph ends the current run and is dropped. A new run
/// also starts when the direction changes, or when adjacent glyphs drift
/// apart: for horizontal text the gap between x-intervals exceeds
/// `x_tolerance` or the top edges differ by more than `y_tolerance`; for
/// vertical text the roles of the axes swap. Overlapping glyphs
/// (fake-bold double strikes) always stay together.
pub fn group_runs(glyphs: &[Glyph], options: &RunOptions) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut current: Vec<&Glyph> = Vec::new();

    for glyph in glyphs {
        if glyph.is_blank() {
            if !current.is_empty() {
                runs.push(make_run(&current));
                current.clear();
            }
            continue;
        }

        if let Some(last) = current.last() {
            if should_split(last, glyph, options) {
                runs.push(make_run(&current));
                current.clear();
            }
        }
        current.push(glyph);
    }

    if !current.is_empty() {
        runs.push(make_run(&current));
    }
    runs
}

fn should_split(last: &Glyph, current: &Glyph, options: &RunOptions) -> bool {
    if last.direction != current.direction {
        return true;
    }
    if current.direction.is_vertical() {
        should_split_vertical(last, current, options)
    } else {
        should_split_horizontal(last, current, options)
    }
}

fn should_split_horizontal(last: &Glyph, current: &Glyph, options: &RunOptions) -> bool {
    let x_gap = (last.bbox.x0.max(current.bbox.x0) - last.bbox.x1.min(current.bbox.x1)).max(0.0);
    let y_diff = (current.bbox.top - last.bbox.top).abs();
    x_gap > options.x_tolerance || y_diff > options.y_tolerance
}

fn should_split_vertical(last: &Glyph, current: &Glyph, options: &RunOptions) -> bool {
    let y_gap = (last.bbox.top.max(current.bbox.top) - last.bbox.bottom.min(current.bbox.bottom)).max(0.0);
    let x_diff = (current.bbox.x0 - last.bbox.x0).abs();
    y_gap > options.y_tolerance || x_diff > options.x_tolerance
}

fn make_run(glyphs: &[&Glyph]) -> TextRun {
    let text: String = glyphs.iter().map(|g| g.text.as_str()).collect();
    let bbox = glyphs
        .iter()
        .skip(1)
        .fold(glyphs[0].bbox, |acc, g| acc.union(&g.bbox));
    TextRun {
        text,
        bbox,
        glyph_count: glyphs.len(),
        direction: glyphs[0].direction,
    }
}

/// Total extracted text length of a page: the sum of run lengths.
///
/// Whitespace separators are not counted.
pub fn total_text_len(runs: &[TextRun]) -> usize {
    runs.iter().map(TextRun::len).sum()
}
