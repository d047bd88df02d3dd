//! The PDF watermark cleaning pipeline.
//!
//! Cleaning is strictly two-phase: every page is scanned and classified
//! first, then redactions are applied and removals executed, highest
//! index first.

use mangaclean_core::{
    CleanError, CleanOptions, CleanReport, PageDisposition, PageReport, classify, removal_order,
};
use tracing::{debug, info, warn};

use crate::Document;
use crate::redact::redact_page;
use crate::scan::scan_page;

/// Scan and classify every page without touching the document.
///
/// `removed` in the returned report lists the pages a [`clean`] pass
/// would delete.
pub fn inspect(doc: &Document, options: &CleanOptions) -> Result<CleanReport, CleanError> {
    let mut report = CleanReport::default();
    for index in 0..doc.page_count() {
        let scan = scan_page(doc, index, options)?;
        let disposition = classify(
            scan.watermark_found(),
            scan.has_image,
            scan.text_len,
            options.min_content_chars,
        );
        debug!(page = index, %disposition, text_len = scan.text_len, has_image = scan.has_image, "classified");

        for warning in &scan.warnings {
            warn!(page = index, "{warning}");
        }
        report.warnings.extend(scan.warnings);
        if disposition == PageDisposition::Remove {
            report.removed.push(index);
        }
        report.pages.push(PageReport {
            index,
            disposition,
            text_len: scan.text_len,
            has_image: scan.has_image,
            areas: scan.areas,
            links_removed: 0,
        });
    }
    Ok(report)
}

/// Remove the watermark from a document in place.
///
/// Watermarked pages with real content get their watermark links removed
/// and white covers appended over each watermark run; watermarked filler
/// pages are deleted. Pages without the watermark are left byte-for-byte
/// unchanged.
pub fn clean(doc: &mut Document, options: &CleanOptions) -> Result<CleanReport, CleanError> {
    let mut report = inspect(doc, options)?;

    for page in report
        .pages
        .iter_mut()
        .filter(|p| p.disposition == PageDisposition::Redact)
    {
        let links = redact_page(doc, page.index, &page.areas, options)?;
        page.links_removed = links.value;
        report.warnings.extend(links.warnings);
    }

    for index in removal_order(report.removed.iter().copied()) {
        doc.backend_mut().remove_page(index)?;
    }

    info!(
        pages = report.pages_scanned(),
        redacted = report.pages_redacted(),
        areas = report.areas_found(),
        links = report.links_removed(),
        removed = report.removed.len(),
        "watermark pass complete"
    );
    Ok(report)
}
