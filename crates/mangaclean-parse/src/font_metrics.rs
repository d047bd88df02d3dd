//! Font metrics extraction from PDF font dictionaries.
//!
//! Parses /Widths, /FirstChar, /LastChar, and /FontDescriptor to provide
//! glyph widths, ascent, and descent for glyph bounding box calculation.
//! Falls back to the standard 14 tables when /Widths is absent, and to
//! /DW of the descendant font for Type0 fonts.

use crate::standard_fonts;

/// Default ascent when not specified (750/1000 of text space).
const DEFAULT_ASCENT: f64 = 750.0;

/// Default descent when not specified (-250/1000 of text space).
const DEFAULT_DESCENT: f64 = -250.0;

/// Default character width when not specified (600/1000 of text space).
const DEFAULT_WIDTH: f64 = 600.0;

/// Default width of a CID font glyph (/DW default).
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Font metrics for one font resource.
///
/// Width values are in glyph space units (1/1000 of text space).
#[derive(Debug, Clone)]
pub struct FontMetrics {
    widths: Vec<f64>,
    first_char: u32,
    missing_width: f64,
    standard: Option<&'static standard_fonts::StandardFontData>,
    ascent: f64,
    descent: f64,
}

impl FontMetrics {
    pub fn new(widths: Vec<f64>, first_char: u32, missing_width: f64, ascent: f64, descent: f64) -> Self {
        Self {
            widths,
            first_char,
            missing_width,
            standard: None,
            ascent,
            descent,
        }
    }

    /// Metrics used when the font resource cannot be found.
    pub fn default_metrics() -> Self {
        Self::new(Vec::new(), 0, DEFAULT_WIDTH, DEFAULT_ASCENT, DEFAULT_DESCENT)
    }

    /// Width for a character code in glyph space.
    pub fn get_width(&self, char_code: u32) -> f64 {
        if char_code >= self.first_char {
            if let Some(w) = self.widths.get((char_code - self.first_char) as usize) {
                return *w;
            }
        }
        match self.standard {
            Some(data) => data.width(char_code),
            None => self.missing_width,
        }
    }

    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    pub fn descent(&self) -> f64 {
        self.descent
    }

    /// Ascent/descent pair used for glyph boxes.
    ///
    /// The box height is always one em: the bottom sits at the font's
    /// descent and the top at `1000 + descent`. A descriptor that reports
    /// zero for both means "unknown" and spans baseline to one em above.
    pub fn vertical_extent(&self) -> (f64, f64) {
        if self.ascent == 0.0 && self.descent == 0.0 {
            (1000.0, 0.0)
        } else {
            (1000.0 + self.descent, self.descent)
        }
    }
}

/// Extract [`FontMetrics`] from a lopdf font dictionary.
///
/// Missing entries never fail: each falls back to a default.
pub fn extract_font_metrics(doc: &lopdf::Document, font_dict: &lopdf::Dictionary) -> FontMetrics {
    if is_type0(font_dict) {
        return extract_cid_metrics(doc, font_dict);
    }

    let first_char = font_dict
        .get(b"FirstChar")
        .ok()
        .and_then(object_to_f64_opt)
        .map_or(0, |v| v as u32);

    let widths: Vec<f64> = font_dict
        .get(b"Widths")
        .ok()
        .map(|obj| resolve_object(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .map(|arr| {
            arr.iter()
                .map(|o| object_to_f64_opt(resolve_object(doc, o)).unwrap_or(0.0))
                .collect()
        })
        .unwrap_or_default();

    let descriptor = font_descriptor(doc, font_dict);
    let (ascent, descent, missing_width) = descriptor_values(descriptor);

    let mut metrics = FontMetrics::new(widths, first_char, missing_width, ascent, descent);
    if metrics.widths.is_empty() {
        metrics.standard = base_font(font_dict).and_then(standard_fonts::lookup);
    }
    metrics
}

/// Whether the font is a composite (Type0) font with two-byte codes.
pub fn is_type0(font_dict: &lopdf::Dictionary) -> bool {
    font_dict
        .get(b"Subtype")
        .and_then(|o| o.as_name())
        .is_ok_and(|n| n == b"Type0")
}

/// The /BaseFont name, if present.
pub fn base_font(font_dict: &lopdf::Dictionary) -> Option<&str> {
    font_dict
        .get(b"BaseFont")
        .and_then(|o| o.as_name())
        .ok()
        .and_then(|n| std::str::from_utf8(n).ok())
}

fn extract_cid_metrics(doc: &lopdf::Document, font_dict: &lopdf::Dictionary) -> FontMetrics {
    let descendant = font_dict
        .get(b"DescendantFonts")
        .ok()
        .map(|o| resolve_object(doc, o))
        .and_then(|o| o.as_array().ok())
        .and_then(|arr| arr.first())
        .map(|o| resolve_object(doc, o))
        .and_then(|o| o.as_dict().ok());

    let Some(descendant) = descendant else {
        return FontMetrics::new(Vec::new(), 0, DEFAULT_CID_WIDTH, DEFAULT_ASCENT, DEFAULT_DESCENT);
    };

    let dw = descendant
        .get(b"DW")
        .ok()
        .and_then(object_to_f64_opt)
        .unwrap_or(DEFAULT_CID_WIDTH);
    let (ascent, descent, _) = descriptor_values(font_descriptor(doc, descendant));
    FontMetrics::new(Vec::new(), 0, dw, ascent, descent)
}

fn font_descriptor<'a>(
    doc: &'a lopdf::Document,
    font_dict: &'a lopdf::Dictionary,
) -> Option<&'a lopdf::Dictionary> {
    font_dict
        .get(b"FontDescriptor")
        .ok()
        .map(|obj| resolve_object(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
}

fn descriptor_values(desc: Option<&lopdf::Dictionary>) -> (f64, f64, f64) {
    let Some(desc) = desc else {
        return (DEFAULT_ASCENT, DEFAULT_DESCENT, DEFAULT_WIDTH);
    };
    let number = |key: &[u8], default: f64| {
        desc.get(key)
            .ok()
            .and_then(object_to_f64_opt)
            .unwrap_or(default)
    };
    (
        number(b"Ascent", DEFAULT_ASCENT),
        number(b"Descent", DEFAULT_DESCENT),
        number(b"MissingWidth", DEFAULT_WIDTH),
    )
}

/// Resolve an indirect reference to the actual object.
pub(crate) fn resolve_object<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Convert a lopdf object to f64, returning None if not a number.
pub(crate) fn object_to_f64_opt(obj: &lopdf::Object) -> Option<f64> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}
