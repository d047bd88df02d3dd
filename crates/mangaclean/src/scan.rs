//! Text and glyph scanning of a single page.

use mangaclean_core::{
    BBox, CleanError, CleanOptions, Glyph, MediaBox, ScanWarning, TextRun, WarningCode,
    WatermarkArea, find_areas, group_runs, is_covered, total_text_len,
};
use mangaclean_parse::{CharEvent, ContentHandler, FillEvent, InterpretOptions, glyph_from_event};
use tracing::{debug, warn};

use crate::Document;

/// What one extraction pass over a page found.
#[derive(Debug, Clone)]
pub struct PageScan {
    /// Page index (0-based).
    pub index: usize,
    /// Text runs in content order.
    pub runs: Vec<TextRun>,
    /// Runs containing the watermark token that are still visible.
    pub areas: Vec<WatermarkArea>,
    /// Total extracted text length (sum of run lengths).
    pub text_len: usize,
    /// Whether the page's resources reference any raster image.
    pub has_image: bool,
    pub warnings: Vec<ScanWarning>,
}

impl PageScan {
    pub fn watermark_found(&self) -> bool {
        !self.areas.is_empty()
    }
}

/// Collects glyphs and opaque white fills while a page is interpreted.
struct ScanHandler {
    page_index: usize,
    media_box: MediaBox,
    glyphs: Vec<Glyph>,
    /// White fills with the number of glyphs shown before them.
    fills: Vec<(usize, BBox)>,
    warnings: Vec<ScanWarning>,
}

impl ScanHandler {
    fn new(page_index: usize, media_box: MediaBox) -> Self {
        Self {
            page_index,
            media_box,
            glyphs: Vec::new(),
            fills: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Fills painted after every glyph they enclose, i.e. fills that hide text.
    fn covers(&self) -> Vec<BBox> {
        self.fills
            .iter()
            .filter(|(shown_before, rect)| {
                self.glyphs
                    .iter()
                    .enumerate()
                    .filter(|(_, g)| rect.contains(&g.bbox))
                    .all(|(i, _)| i < *shown_before)
            })
            .map(|(_, rect)| *rect)
            .collect()
    }
}

impl ContentHandler for ScanHandler {
    fn on_char(&mut self, event: CharEvent) {
        self.glyphs.push(glyph_from_event(&event, &self.media_box));
    }

    fn on_fill(&mut self, event: FillEvent) {
        if event.white {
            let rect = self
                .media_box
                .to_top_left(event.min_x, event.min_y, event.max_x, event.max_y);
            self.fills.push((self.glyphs.len(), rect));
        }
    }

    fn on_warning(&mut self, mut warning: ScanWarning) {
        if warning.page.is_none() {
            warning.page = Some(self.page_index);
        }
        self.warnings.push(warning);
    }
}

/// Scan one page for watermark runs.
///
/// The page is never mutated. A content stream that cannot be
/// interpreted at all is reported as a warning and the page is treated
/// as carrying no text.
pub fn scan_page(doc: &Document, index: usize, options: &CleanOptions) -> Result<PageScan, CleanError> {
    let media_box = doc.media_box(index)?;
    let images = doc.page_images(index)?;

    let mut handler = ScanHandler::new(index, media_box);
    let interpret = InterpretOptions {
        max_recursion_depth: options.max_recursion_depth,
    };
    if let Err(e) = doc.backend().interpret_page(index, &mut handler, &interpret) {
        warn!(page = index, error = %e, "text extraction failed; skipping watermark detection");
        handler.glyphs.clear();
        handler.fills.clear();
        handler.warnings.push(
            ScanWarning::new(
                WarningCode::MalformedText,
                format!("page content skipped: {e}"),
            )
            .on_page(index),
        );
    }

    let runs = group_runs(&handler.glyphs, &options.run_options());
    let covers = handler.covers();
    let areas: Vec<WatermarkArea> = find_areas(&runs, &options.token)
        .into_iter()
        .filter(|area| !is_covered(&area.bbox, &covers))
        .collect();
    let text_len = total_text_len(&runs);

    let mut warnings = handler.warnings;
    warnings.extend(images.warnings);

    debug!(
        page = index,
        runs = runs.len(),
        text_len,
        areas = areas.len(),
        images = images.value.len(),
        "scanned page"
    );

    Ok(PageScan {
        index,
        runs,
        areas,
        text_len,
        has_image: !images.value.is_empty(),
        warnings,
    })
}
