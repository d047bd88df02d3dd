//! Image geometry resizer.
//!
//! Redraws each page's dominant image under a [`CropMode`], replacing the
//! page content wholesale.

use mangaclean_core::{
    CleanError, CropMode, ImageInfo, Placement, ResizeOptions, compute_placement, is_underfilled,
    select_dominant,
};
use mangaclean_parse::{Object, Operation, XObjectImage};
use tracing::{debug, info};

use crate::Document;

/// The page's largest image above the area floor, if any.
///
/// Images that cannot be resolved are treated as absent.
pub fn dominant_image(
    doc: &Document,
    index: usize,
    options: &ResizeOptions,
) -> Result<Option<XObjectImage>, CleanError> {
    let images = doc.page_images(index)?;
    for warning in &images.warnings {
        debug!(page = index, "{warning}");
    }
    let infos: Vec<ImageInfo> = images.value.iter().map(|i| i.info.clone()).collect();
    let Some(best) = select_dominant(&infos, options.min_image_area) else {
        return Ok(None);
    };
    Ok(images.value.into_iter().find(|i| i.info == *best))
}

/// Quick check of whether any of the leading pages has an under-filled
/// dominant image.
pub fn needs_resizing(doc: &Document, options: &ResizeOptions) -> Result<bool, CleanError> {
    for index in 0..doc.page_count().min(options.sample_pages) {
        let Some(image) = dominant_image(doc, index, options)? else {
            continue;
        };
        let page_width = doc.media_box(index)?.width();
        if is_underfilled(image.info.width, page_width, options.width_ratio) {
            debug!(page = index, image_width = image.info.width, page_width, "under-filled page");
            return Ok(true);
        }
    }
    Ok(false)
}

/// Content drawing a single named image at `placement`.
pub fn draw_image_operations(name: &str, placement: &Placement) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(placement.width),
                Object::Integer(0),
                Object::Integer(0),
                real(placement.height),
                real(placement.x),
                real(placement.y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Redraw every eligible page's dominant image under `mode`.
///
/// Page 0 is skipped when `options.keep_cover` is set; pages without a
/// dominant image are skipped. Returns the number of pages rewritten.
pub fn apply_resize(
    doc: &mut Document,
    mode: CropMode,
    options: &ResizeOptions,
) -> Result<usize, CleanError> {
    if mode == CropMode::Skip {
        return Ok(0);
    }
    let first = usize::from(options.keep_cover);
    let mut resized = 0;
    for index in first..doc.page_count() {
        let Some(image) = dominant_image(doc, index, options)? else {
            continue;
        };
        let media_box = doc.media_box(index)?;
        let Some(mut placement) = compute_placement(
            mode,
            media_box.width(),
            media_box.height(),
            f64::from(image.info.width),
            f64::from(image.info.height),
        ) else {
            continue;
        };
        placement.x += media_box.x0;
        placement.y += media_box.y0;

        debug!(
            page = index,
            image = %image.info.name,
            x = placement.x,
            y = placement.y,
            w = placement.width,
            h = placement.height,
            "redrawing dominant image"
        );
        doc.backend_mut()
            .replace_content(index, draw_image_operations(&image.info.name, &placement))?;
        resized += 1;
    }
    info!(%mode, pages = resized, "resize pass complete");
    Ok(resized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_operations_scale_then_translate() {
        let placement = Placement {
            x: 0.0,
            y: -150.0,
            width: 1000.0,
            height: 1800.0,
        };
        let ops = draw_image_operations("Im7", &placement);
        let operators: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators, ["q", "cm", "Do", "Q"]);
        let cm: Vec<f64> = ops[1]
            .operands
            .iter()
            .map(|o| match o {
                Object::Integer(i) => *i as f64,
                Object::Real(r) => f64::from(*r),
                _ => f64::NAN,
            })
            .collect();
        assert_eq!(cm, [1000.0, 0.0, 0.0, 1800.0, 0.0, -150.0]);
        assert_eq!(ops[2].operands[0].as_name().unwrap(), b"Im7");
    }
}
