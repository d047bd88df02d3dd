//! Glyph bounding box calculation from content stream events.
//!
//! Combines font metrics, text state, and CTM to calculate the final
//! bounding box for each glyph in top-left origin page coordinates.

use mangaclean_core::{Ctm, Glyph, MediaBox, Point, TextDirection};

use crate::handler::CharEvent;

/// Convert a [`CharEvent`] into a [`Glyph`] positioned on the page.
///
/// Builds the text rendering matrix `[Tfs*Th 0 0 Tfs 0 Trise] × Tm × CTM`,
/// maps the glyph's advance/ascent/descent rectangle through it, and flips
/// the result against the top of `media_box`. The direction comes from the
/// dominant axis of the same matrix.
pub fn glyph_from_event(event: &CharEvent, media_box: &MediaBox) -> Glyph {
    let font_size = event.font_size;
    let font_matrix = Ctm::new(font_size * event.h_scaling, 0.0, 0.0, font_size, 0.0, event.rise);
    let tm = Ctm::from_array(event.text_matrix);
    let ctm = Ctm::from_array(event.ctm);
    let trm = font_matrix.concat(&tm).concat(&ctm);

    let w_norm = event.displacement / 1000.0;
    let ascent_norm = event.ascent / 1000.0;
    let descent_norm = event.descent / 1000.0;

    let corners = [
        trm.transform_point(Point::new(0.0, descent_norm)),
        trm.transform_point(Point::new(w_norm, descent_norm)),
        trm.transform_point(Point::new(w_norm, ascent_norm)),
        trm.transform_point(Point::new(0.0, ascent_norm)),
    ];
    let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    let text = event.unicode.clone().unwrap_or_else(|| {
        char::from_u32(event.char_code)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "\u{FFFD}".to_string())
    });

    Glyph {
        text,
        bbox: media_box.to_top_left(min_x, min_y, max_x, max_y),
        fontname: event.font_name.clone(),
        size: font_size,
        direction: TextDirection::from_matrix(trm.a, trm.b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: MediaBox = MediaBox {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
    };

    fn default_event() -> CharEvent {
        CharEvent {
            char_code: 65,
            unicode: Some("A".to_string()),
            font_name: "Helvetica".to_string(),
            font_size: 12.0,
            text_matrix: [1.0, 0.0, 0.0, 1.0, 72.0, 720.0],
            ctm: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            displacement: 667.0,
            h_scaling: 1.0,
            rise: 0.0,
            ascent: 750.0,
            descent: -250.0,
        }
    }

    fn assert_approx(actual: f64, expected: f64, msg: &str) {
        assert!(
            (actual - expected).abs() < 0.01,
            "{msg}: expected {expected}, got {actual}"
        );
    }

    #[test]
    fn simple_horizontal_glyph() {
        let glyph = glyph_from_event(&default_event(), &LETTER);
        // Trm = [12 0 0 12 72 720]; box y 717..729 -> top 63, bottom 75
        assert_approx(glyph.bbox.x0, 72.0, "x0");
        assert_approx(glyph.bbox.x1, 80.004, "x1");
        assert_approx(glyph.bbox.top, 63.0, "top");
        assert_approx(glyph.bbox.bottom, 75.0, "bottom");
        assert_eq!(glyph.text, "A");
        assert_eq!(glyph.size, 12.0);
    }

    #[test]
    fn ctm_scales_glyph() {
        let event = CharEvent {
            ctm: [2.0, 0.0, 0.0, 2.0, 0.0, 0.0],
            text_matrix: [1.0, 0.0, 0.0, 1.0, 36.0, 360.0],
            ..default_event()
        };
        let glyph = glyph_from_event(&event, &LETTER);
        assert_approx(glyph.bbox.x0, 72.0, "x0");
        assert_approx(glyph.bbox.height(), 24.0, "height");
        assert_approx(glyph.bbox.bottom, 792.0 - 714.0, "bottom");
    }

    #[test]
    fn rise_lifts_glyph() {
        let event = CharEvent {
            rise: 5.0,
            ..default_event()
        };
        let glyph = glyph_from_event(&event, &LETTER);
        assert_approx(glyph.bbox.top, 58.0, "top");
    }

    #[test]
    fn horizontal_scaling_widens_glyph() {
        let event = CharEvent {
            h_scaling: 0.5,
            ..default_event()
        };
        let glyph = glyph_from_event(&event, &LETTER);
        assert_approx(glyph.bbox.width(), 4.002, "width");
    }

    #[test]
    fn missing_unicode_falls_back_to_code() {
        let event = CharEvent {
            unicode: None,
            char_code: 0x6F,
            ..default_event()
        };
        assert_eq!(glyph_from_event(&event, &LETTER).text, "o");
    }

    #[test]
    fn media_box_offset_origin() {
        let mb = MediaBox::new(0.0, 100.0, 612.0, 892.0);
        let glyph = glyph_from_event(&default_event(), &mb);
        assert_approx(glyph.bbox.top, 163.0, "top");
    }

    #[test]
    fn rotated_glyph_runs_bottom_to_top() {
        // 0 1 -1 0 580 200 Tm
        let event = CharEvent {
            text_matrix: [0.0, 1.0, -1.0, 0.0, 580.0, 200.0],
            ..default_event()
        };
        let glyph = glyph_from_event(&event, &LETTER);
        assert_eq!(glyph.direction, TextDirection::Btt);
        // Ascent extends left of the baseline, advance runs up the page.
        assert_approx(glyph.bbox.x0, 571.0, "x0");
        assert_approx(glyph.bbox.x1, 583.0, "x1");
        assert_approx(glyph.bbox.bottom, 592.0, "bottom");
        assert_approx(glyph.bbox.top, 592.0 - 8.004, "top");
        assert_eq!(glyph_from_event(&default_event(), &LETTER).direction, TextDirection::Ltr);
    }
}
