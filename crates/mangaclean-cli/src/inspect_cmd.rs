use std::path::Path;

use mangaclean::{
    BBox, CleanOptions, ImageInfo, PageReport, ResizeOptions, dominant_image, inspect,
};

use crate::cli::TextFormat;
use crate::shared::open_pdf;

fn format_bbox(b: &BBox) -> String {
    format!("[{:.2}, {:.2}, {:.2}, {:.2}]", b.x0, b.top, b.x1, b.bottom)
}

pub fn run(file: &Path, format: &TextFormat) -> Result<(), i32> {
    let doc = open_pdf(file)?;
    let report = inspect(&doc, &CleanOptions::default()).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    let resize = ResizeOptions::default();
    let mut dominant: Vec<Option<ImageInfo>> = Vec::with_capacity(report.pages.len());
    for page in &report.pages {
        let image = dominant_image(&doc, page.index, &resize).map_err(|e| {
            eprintln!("Error reading page {}: {e}", page.index + 1);
            1
        })?;
        dominant.push(image.map(|i| i.info));
    }

    match format {
        TextFormat::Text => {
            for (page, image) in report.pages.iter().zip(&dominant) {
                print_page(page, image.as_ref());
            }
            for warning in &report.warnings {
                println!("Warning: {warning}");
            }
            println!(
                "Summary: {} pages, {} redacted, {} removed, {} watermark areas, {} warnings",
                report.pages_scanned(),
                report.pages_redacted(),
                report.removed.len(),
                report.areas_found(),
                report.warnings.len()
            );
        }
        TextFormat::Json => {
            let pages: Vec<serde_json::Value> = report
                .pages
                .iter()
                .zip(&dominant)
                .map(|(page, image)| {
                    let mut value = serde_json::to_value(page).unwrap_or_default();
                    value["page"] = serde_json::json!(page.index + 1);
                    value["dominant_image"] = serde_json::to_value(image).unwrap_or_default();
                    value
                })
                .collect();
            let output = serde_json::json!({
                "file": file.display().to_string(),
                "pages": pages,
                "removed": report.removed,
                "warnings": report.warnings,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_default()
            );
        }
    }
    Ok(())
}

fn print_page(page: &PageReport, image: Option<&ImageInfo>) {
    let image = match image {
        Some(info) => format!("{} ({}x{})", info.name, info.width, info.height),
        None => "none".to_string(),
    };
    println!(
        "Page {}: {}  text={}  dominant image: {}",
        page.index + 1,
        page.disposition,
        page.text_len,
        image
    );
    for area in &page.areas {
        println!("  watermark {:?} at {}", area.text, format_bbox(&area.bbox));
    }
}
