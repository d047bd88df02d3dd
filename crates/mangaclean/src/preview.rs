//! Low-fidelity page rendering for policy previews.
//!
//! Only raster images are drawn: each placed image is decoded, scaled
//! into its placement rectangle and composited onto a white page-sized
//! canvas at 1 pt = 1 px. Text and vector graphics are not rasterized,
//! which is enough to judge how a manga page's artwork fills the page.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage};
use lopdf::{Object, Stream};
use mangaclean_core::{CleanError, Ctm};
use mangaclean_parse::{ContentHandler, ImageEvent, InterpretOptions};
use tracing::{debug, warn};

use crate::Document;

/// Largest canvas or placement side, in pixels.
const MAX_SIDE: u32 = 10_000;

/// A rendered preview page.
#[derive(Debug, Clone)]
pub struct Preview {
    /// Index of the rendered page.
    pub page_index: usize,
    pub image: RgbImage,
}

impl Preview {
    /// Write the rendering as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), CleanError> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| CleanError::Image(format!("failed to write {}: {e}", path.display())))
    }
}

/// Page shown in previews: the third page when there are more than
/// three, otherwise the last one.
pub fn preview_page_index(page_count: usize) -> Option<usize> {
    match page_count {
        0 => None,
        n if n > 3 => Some(2),
        n => Some(n - 1),
    }
}

/// Render the preview page of a document, or `None` if it has no pages.
pub fn render_preview(doc: &Document) -> Result<Option<Preview>, CleanError> {
    let Some(page_index) = preview_page_index(doc.page_count()) else {
        return Ok(None);
    };
    let image = render_page(doc, page_index)?;
    Ok(Some(Preview { page_index, image }))
}

#[derive(Default)]
struct ImageCollector {
    images: Vec<ImageEvent>,
}

impl ContentHandler for ImageCollector {
    fn on_image(&mut self, event: ImageEvent) {
        self.images.push(event);
    }
}

/// Render one page's placed images onto a white canvas.
pub fn render_page(doc: &Document, index: usize) -> Result<RgbImage, CleanError> {
    let media_box = doc.media_box(index)?;
    let canvas_w = clamp_side(media_box.width());
    let canvas_h = clamp_side(media_box.height());
    let mut canvas = RgbImage::from_pixel(canvas_w, canvas_h, Rgb([255, 255, 255]));

    let mut collector = ImageCollector::default();
    doc.backend()
        .interpret_page(index, &mut collector, &InterpretOptions::default())?;

    for event in collector.images {
        let (min_x, min_y, max_x, max_y) = Ctm::from_array(event.ctm).unit_square_bounds();
        let width = clamp_side(max_x - min_x);
        let height = clamp_side(max_y - min_y);
        let left = (min_x - media_box.x0).round() as i64;
        let top = (media_box.y1 - max_y).round() as i64;

        let decoded = doc
            .backend()
            .image_stream(event.object_id)
            .map_err(CleanError::from)
            .and_then(decode_image);
        let decoded = match decoded {
            Ok(img) => img,
            Err(e) => {
                warn!(page = index, image = %event.name, error = %e, "image skipped in preview");
                continue;
            }
        };
        debug!(page = index, image = %event.name, left, top, width, height, "compositing");
        let scaled = imageops::resize(&decoded.to_rgb8(), width, height, FilterType::Triangle);
        imageops::overlay(&mut canvas, &scaled, left, top);
    }
    Ok(canvas)
}

fn clamp_side(points: f64) -> u32 {
    if points.is_finite() {
        (points.round().max(1.0) as u32).min(MAX_SIDE)
    } else {
        1
    }
}

/// Decode an image XObject stream.
///
/// Supports JPEG (`DCTDecode`) and 8-bit DeviceGray / DeviceRGB /
/// DeviceCMYK samples, raw or behind a filter lopdf can decompress.
pub fn decode_image(stream: &Stream) -> Result<DynamicImage, CleanError> {
    let dict = &stream.dict;
    let filters: Vec<&[u8]> = match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.as_slice()],
        Ok(Object::Array(items)) => items.iter().filter_map(|o| o.as_name().ok()).collect(),
        _ => Vec::new(),
    };
    if filters == [b"DCTDecode".as_slice()] {
        return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
            .map_err(|e| CleanError::Image(format!("failed to decode JPEG image: {e}")));
    }

    let dimension = |key: &[u8]| {
        dict.get(key)
            .ok()
            .and_then(|o| o.as_i64().ok())
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .ok_or_else(|| CleanError::Image(format!("image has no valid /{}", String::from_utf8_lossy(key))))
    };
    let width = dimension(b"Width")?;
    let height = dimension(b"Height")?;
    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        return Err(CleanError::Image(format!("unsupported {bits}-bit image")));
    }

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| CleanError::Image(format!("failed to decompress image: {e}")))?
    };

    let pixels = width as usize * height as usize;
    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| o.as_name().ok())
        .unwrap_or(b"");
    let components = match color_space {
        b"DeviceGray" | b"G" => 1,
        b"DeviceRGB" | b"RGB" => 3,
        b"DeviceCMYK" | b"CMYK" => 4,
        // ICC-based or indexed: guess from the sample count.
        _ if data.len() >= pixels * 3 => 3,
        _ => 1,
    };
    if data.len() < pixels * components {
        return Err(CleanError::Image(format!(
            "image data too short: {} bytes for {width}x{height}x{components}",
            data.len()
        )));
    }

    let image = match components {
        1 => GrayImage::from_raw(width, height, data[..pixels].to_vec()).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, data[..pixels * 3].to_vec()).map(DynamicImage::ImageRgb8),
        _ => {
            let rgb = data[..pixels * 4]
                .chunks_exact(4)
                .flat_map(|cmyk| {
                    let k = 255 - u16::from(cmyk[3]);
                    [0, 1, 2].map(|i| ((255 - u16::from(cmyk[i])) * k / 255) as u8)
                })
                .collect();
            RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
        }
    };
    image.ok_or_else(|| CleanError::Image("image buffer size mismatch".to_string()))
}
