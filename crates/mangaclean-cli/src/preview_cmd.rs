use std::path::Path;

use mangaclean::render_preview;

use crate::shared::open_pdf;

pub fn run(file: &Path, out: &Path) -> Result<(), i32> {
    let doc = open_pdf(file)?;
    let preview = render_preview(&doc).map_err(|e| {
        eprintln!("Error: failed to render preview: {e}");
        1
    })?;
    let Some(preview) = preview else {
        eprintln!("Error: {} has no pages", file.display());
        return Err(1);
    };
    preview.save_png(out).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    eprintln!(
        "Preview of page {} written to {}",
        preview.page_index + 1,
        out.display()
    );
    Ok(())
}
