//! Content handler callback trait for content stream interpretation.
//!
//! The interpreter calls [`ContentHandler`] methods as it processes page
//! content. The scanner subscribes to glyphs, the previewer to images.

use mangaclean_core::ScanWarning;

/// Information about a rendered character glyph.
///
/// Produced for each character code shown by `Tj`, `TJ`, `'`, and `"`.
/// Carries the positioning and font context needed to compute the glyph's
/// bounding box.
#[derive(Debug, Clone)]
pub struct CharEvent {
    /// The character code from the PDF content stream.
    pub char_code: u32,
    /// Unicode text if a ToUnicode mapping or a simple encoding applies.
    pub unicode: Option<String>,
    /// Font name with any subset prefix removed.
    pub font_name: String,
    /// Font size in text space units.
    pub font_size: f64,
    /// The text matrix at the time the glyph was shown.
    pub text_matrix: [f64; 6],
    /// The current transformation matrix at the time the glyph was shown.
    pub ctm: [f64; 6],
    /// Glyph width in glyph space units (1/1000 of text space).
    pub displacement: f64,
    /// Horizontal scaling as a fraction (100% = 1.0).
    pub h_scaling: f64,
    /// Text rise (Ts operator).
    pub rise: f64,
    /// Font ascent in glyph space units.
    pub ascent: f64,
    /// Font descent in glyph space units (negative).
    pub descent: f64,
}

/// Information about a placed image.
///
/// The CTM maps the unit square onto the page area the image covers.
#[derive(Debug, Clone)]
pub struct ImageEvent {
    /// Image XObject name reference (e.g., "Im0").
    pub name: String,
    /// Object id of the image stream.
    pub object_id: lopdf::ObjectId,
    /// CTM at the time of image placement.
    pub ctm: [f64; 6],
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// A filled rectangle (`re` followed by a fill operator).
///
/// Bounds are in PDF user space after the CTM, bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillEvent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    /// Whether the nonstroking color was opaque white.
    pub white: bool,
}

/// Callback handler for content stream interpretation.
///
/// All methods have default no-op implementations, allowing handlers to
/// subscribe only to the event types they care about.
pub trait ContentHandler {
    /// Called when a character glyph is rendered.
    fn on_char(&mut self, _event: CharEvent) {}

    /// Called when an image XObject is placed on the page.
    fn on_image(&mut self, _event: ImageEvent) {}

    /// Called when a rectangle is filled.
    fn on_fill(&mut self, _event: FillEvent) {}

    /// Called when a non-fatal problem is recovered from.
    fn on_warning(&mut self, _warning: ScanWarning) {}
}
