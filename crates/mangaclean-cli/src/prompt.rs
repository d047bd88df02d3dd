//! Interactive crop mode prompt on the terminal.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use mangaclean::{CropMode, PolicyDecider, Preview, output_path};

/// Asks on stderr/stdin which crop mode the batch should use.
///
/// The preview is written as `<stem>_preview.png` where the cleaned file
/// will go, so it can be opened in an image viewer before answering.
pub struct PromptPolicy<R, W> {
    input: R,
    output: W,
    output_dir: Option<PathBuf>,
}

impl<R: BufRead, W: Write> PromptPolicy<R, W> {
    pub fn new(input: R, output: W, output_dir: Option<PathBuf>) -> Self {
        Self {
            input,
            output,
            output_dir,
        }
    }

    fn show_preview(&mut self, preview: &Preview, file: &Path) {
        let cleaned = output_path(file, self.output_dir.as_deref());
        let png = cleaned.with_file_name(preview_name(&cleaned));
        if let Some(dir) = png.parent().filter(|d| !d.as_os_str().is_empty()) {
            let _ = std::fs::create_dir_all(dir);
        }
        match preview.save_png(&png) {
            Ok(()) => {
                let _ = writeln!(
                    self.output,
                    "Preview of page {} written to {}",
                    preview.page_index + 1,
                    png.display()
                );
            }
            Err(e) => {
                let _ = writeln!(self.output, "Could not write preview: {e}");
            }
        }
    }

    fn print_menu(&mut self, file: &Path, batch_len: usize) {
        let _ = writeln!(
            self.output,
            "Page images in {} do not fill the page. Choose a crop mode for all {batch_len} file(s):",
            file.display()
        );
        for (i, mode) in CropMode::ALL.iter().enumerate() {
            let _ = writeln!(self.output, "  {}) {:<12} {}", i + 1, mode.as_str(), mode.describe());
        }
    }
}

fn preview_name(cleaned: &Path) -> String {
    let stem = cleaned
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}_preview.png")
}

/// A menu number (1-based) or a mode name.
fn parse_choice(answer: &str) -> Option<CropMode> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| CropMode::ALL.get(i)).copied();
    }
    answer.parse().ok()
}

impl<R: BufRead, W: Write> PolicyDecider for PromptPolicy<R, W> {
    fn propose_policy(&mut self, preview: Option<&Preview>, file: &Path, batch_len: usize) -> CropMode {
        if let Some(preview) = preview {
            self.show_preview(preview, file);
        }
        self.print_menu(file, batch_len);
        loop {
            let _ = write!(self.output, "> ");
            let _ = self.output.flush();
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return CropMode::Skip,
                Ok(_) => {}
            }
            if let Some(mode) = parse_choice(&line) {
                return mode;
            }
            let _ = writeln!(self.output, "Unknown choice: {}", line.trim());
        }
    }
}
