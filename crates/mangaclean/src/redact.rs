//! Link scrubbing and cover rectangles for watermarked pages.

use mangaclean_core::{CleanError, CleanOptions, CoverRect, Scanned, WatermarkArea, cover_rect};
use mangaclean_parse::{Object, Operation};
use tracing::debug;

use crate::Document;

/// Content operations painting each rectangle opaque white.
///
/// Every rectangle gets its own `q … Q` so the fill color never leaks.
pub fn cover_operations(rects: &[CoverRect]) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(rects.len() * 5);
    for rect in rects {
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("g", vec![Object::Integer(1)]));
        ops.push(Operation::new(
            "re",
            vec![
                real(rect.x),
                real(rect.y),
                real(rect.width),
                real(rect.height),
            ],
        ));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }
    ops
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Redact one page: drop watermark links, then append covers over `areas`.
///
/// Returns the number of link annotations removed. The page's existing
/// content is kept; covers are only ever appended.
pub fn redact_page(
    doc: &mut Document,
    index: usize,
    areas: &[WatermarkArea],
    options: &CleanOptions,
) -> Result<Scanned<usize>, CleanError> {
    let links = doc.backend_mut().remove_uri_links(index, &options.token)?;

    if !areas.is_empty() {
        let media_box = doc.media_box(index)?;
        let rects: Vec<CoverRect> = areas
            .iter()
            .map(|area| cover_rect(area, &media_box, options.cover_margin, options.cover_growth))
            .collect();
        for rect in &rects {
            debug!(page = index, x = rect.x, y = rect.y, w = rect.width, h = rect.height, "cover");
        }
        doc.backend_mut()
            .append_content(index, cover_operations(&rects))?;
    }
    Ok(links)
}
