//! Built-in widths for the standard 14 Type1 fonts.
//!
//! Used when a font dictionary has no `/Widths` array. Only printable
//! ASCII (32..=126) is tabulated; other codes fall back to the missing
//! width. Values are in 1/1000 em units from the Adobe AFM files.

/// Width data for one standard font family.
#[derive(Debug)]
pub struct StandardFontData {
    /// Widths for codes 32..=126.
    ascii_widths: [u16; 95],
    /// Width for codes outside the table.
    pub default_width: u16,
}

impl StandardFontData {
    /// Width of a single-byte character code, in glyph space units.
    pub fn width(&self, code: u32) -> f64 {
        match code {
            32..=126 => f64::from(self.ascii_widths[(code - 32) as usize]),
            _ => f64::from(self.default_width),
        }
    }
}

/// Look up standard font data by base font name.
///
/// Accepts subset-prefixed names and the common Arial/TimesNewRoman
/// aliases. Symbol and ZapfDingbats are not tabulated.
pub fn lookup(base_font: &str) -> Option<&'static StandardFontData> {
    let name = strip_subset_prefix(base_font);
    let family = name.split(',').next().unwrap_or(name);
    match family {
        "Courier" | "Courier-Bold" | "Courier-Oblique" | "Courier-BoldOblique" | "CourierNew"
        | "CourierNewPSMT" => Some(&COURIER),
        "Helvetica" | "Helvetica-Oblique" | "Arial" | "ArialMT" | "Arial-ItalicMT" => {
            Some(&HELVETICA)
        }
        "Helvetica-Bold" | "Helvetica-BoldOblique" | "Arial-BoldMT" | "Arial-BoldItalicMT" => {
            Some(&HELVETICA_BOLD)
        }
        "Times-Roman" | "Times-Bold" | "Times-Italic" | "Times-BoldItalic" | "TimesNewRoman"
        | "TimesNewRomanPSMT" => Some(&TIMES_ROMAN),
        _ => None,
    }
}

/// Strip a six-letter subset tag such as `ABCDEF+` from a font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

static COURIER: StandardFontData = StandardFontData {
    ascii_widths: [600; 95],
    default_width: 600,
};

#[rustfmt::skip]
static HELVETICA: StandardFontData = StandardFontData {
    ascii_widths: [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
    ],
    default_width: 556,
};

#[rustfmt::skip]
static HELVETICA_BOLD: StandardFontData = StandardFontData {
    ascii_widths: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
        975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
        333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
        611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
    ],
    default_width: 556,
};

#[rustfmt::skip]
static TIMES_ROMAN: StandardFontData = StandardFontData {
    ascii_widths: [
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
        921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
        556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
        333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
        500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
    ],
    default_width: 500,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_widths() {
        let data = lookup("Helvetica").unwrap();
        assert_eq!(data.width(u32::from(b' ')), 278.0);
        assert_eq!(data.width(u32::from(b'A')), 667.0);
        assert_eq!(data.width(u32::from(b'O')), 778.0);
        assert_eq!(data.width(u32::from(b'~')), 584.0);
        assert_eq!(data.width(200), 556.0);
    }

    #[test]
    fn courier_is_monospaced() {
        let data = lookup("Courier-Bold").unwrap();
        assert_eq!(data.width(u32::from(b'i')), 600.0);
        assert_eq!(data.width(u32::from(b'W')), 600.0);
    }

    #[test]
    fn subset_prefix_and_aliases() {
        assert_eq!(strip_subset_prefix("ABCDEF+ArialMT"), "ArialMT");
        assert_eq!(strip_subset_prefix("Abc+Font"), "Abc+Font");
        assert!(lookup("ABCDEF+ArialMT").is_some());
        assert!(lookup("Arial,Bold").is_some());
        assert!(lookup("ComicSans").is_none());
    }

    #[test]
    fn times_lowercase_row() {
        let data = lookup("Times-Roman").unwrap();
        assert_eq!(data.width(u32::from(b'a')), 444.0);
        assert_eq!(data.width(u32::from(b'm')), 778.0);
    }
}
