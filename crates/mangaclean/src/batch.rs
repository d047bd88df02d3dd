//! Batch driver over files and directories.
//!
//! Each input is processed independently: a failure is recorded as a
//! [`FileOutcome::Failed`] and the batch moves on. The crop policy for
//! the resizer is carried through the loop as an explicit
//! `Option<CropMode>` and resolved at most once per batch.

use std::fs::File;
use std::path::{Path, PathBuf};

use mangaclean_core::{CleanError, CleanOptions, CleanReport, CropMode, ResizeOptions};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::epub::{EpubCleaner, EpubReport};
use crate::preview::{Preview, render_preview};
use crate::resize::{apply_resize, needs_resizing};
use crate::{Document, clean};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Epub,
}

impl FileKind {
    /// Kind of a path by its extension (case-insensitive).
    pub fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "epub" => Some(FileKind::Epub),
            _ => None,
        }
    }
}

/// Chooses the crop policy for a batch.
///
/// Called at most once per batch, with a rendering of the first PDF that
/// looks like it needs resizing.
pub trait PolicyDecider {
    fn propose_policy(&mut self, preview: Option<&Preview>, file: &Path, batch_len: usize) -> CropMode;
}

/// A decider that always answers with the same mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPolicy(pub CropMode);

impl PolicyDecider for FixedPolicy {
    fn propose_policy(&mut self, _preview: Option<&Preview>, _file: &Path, _batch_len: usize) -> CropMode {
        self.0
    }
}

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Write all outputs here instead of beside each input.
    pub output_dir: Option<PathBuf>,
    /// Crop mode for the whole batch; `None` asks the decider.
    pub mode: Option<CropMode>,
    /// Run the image resizer on PDFs at all.
    pub resize: bool,
    pub clean: CleanOptions,
    pub resize_options: ResizeOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            mode: None,
            resize: true,
            clean: CleanOptions::default(),
            resize_options: ResizeOptions::default(),
        }
    }
}

/// What was done to a cleaned file.
#[derive(Debug, Clone)]
pub enum FileSummary {
    Pdf {
        report: CleanReport,
        /// Pages whose dominant image was redrawn.
        resized: usize,
    },
    Epub(EpubReport),
}

/// Result of processing one input.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Cleaned {
        input: PathBuf,
        output: PathBuf,
        summary: FileSummary,
    },
    Skipped {
        path: PathBuf,
        reason: String,
    },
    Failed {
        path: PathBuf,
        message: String,
    },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Cleaned { input, .. } => input,
            FileOutcome::Skipped { path, .. } | FileOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
    /// The crop mode the batch settled on, if it was ever needed.
    pub mode: Option<CropMode>,
}

impl BatchSummary {
    pub fn cleaned(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Cleaned { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Skipped { .. }))
            .count()
    }
}

/// Inputs gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// PDF and EPUB files in processing order.
    pub files: Vec<PathBuf>,
    /// Paths that could not be used, as ready-made outcomes.
    pub rejected: Vec<FileOutcome>,
}

/// Expand paths into the PDF/EPUB files to process.
///
/// Directories are walked recursively in name order without following
/// symlinks; files inside them with other extensions are ignored. A file named explicitly with an
/// unsupported extension is reported as skipped, a missing path as failed.
pub fn collect_inputs(paths: &[PathBuf]) -> Inputs {
    let mut inputs = Inputs::default();
    for path in paths {
        if path.is_dir() {
            walk_dir(path, &mut inputs);
        } else if path.is_file() {
            if FileKind::of(path).is_some() {
                inputs.files.push(path.clone());
            } else {
                inputs.rejected.push(FileOutcome::Skipped {
                    path: path.clone(),
                    reason: "not a PDF or EPUB file".to_string(),
                });
            }
        } else {
            inputs.rejected.push(FileOutcome::Failed {
                path: path.clone(),
                message: "no such file or directory".to_string(),
            });
        }
    }
    inputs
}

fn walk_dir(dir: &Path, inputs: &mut Inputs) {
    // Symlinks are not followed, so a link back to an ancestor cannot loop.
    let walker = WalkDir::new(dir).follow_links(false).sort_by_file_name();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && FileKind::of(entry.path()).is_some() {
                    inputs.files.push(entry.into_path());
                }
            }
            Err(e) => inputs.rejected.push(FileOutcome::Failed {
                path: e.path().unwrap_or(dir).to_path_buf(),
                message: format!("cannot read directory: {e}"),
            }),
        }
    }
}

/// Output path for an input: `<stem>_clean.<ext>` beside it, or inside
/// `output_dir` when given.
pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_clean.{}", ext.to_string_lossy()),
        None => format!("{stem}_clean"),
    };
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Clean every input, continuing past per-file failures.
pub fn run_batch(paths: &[PathBuf], options: &BatchOptions, decider: &mut dyn PolicyDecider) -> BatchSummary {
    let inputs = collect_inputs(paths);
    let batch_len = inputs.files.len();
    let mut outcomes = inputs.rejected;
    let mut mode = options.mode;

    for (position, input) in inputs.files.into_iter().enumerate() {
        info!(file = %input.display(), "processing {}/{batch_len}", position + 1);
        let output = output_path(&input, options.output_dir.as_deref());
        let result = match FileKind::of(&input) {
            Some(FileKind::Pdf) => process_pdf(&input, &output, options, &mut mode, decider, batch_len),
            Some(FileKind::Epub) => process_epub(&input, &output).map(FileSummary::Epub),
            None => Err(CleanError::InvalidInput("not a PDF or EPUB file".to_string())),
        };
        let outcome = match result {
            Ok(summary) => FileOutcome::Cleaned {
                input,
                output,
                summary,
            },
            Err(e) => {
                warn!(file = %input.display(), error = %e, "file failed");
                FileOutcome::Failed {
                    path: input,
                    message: e.to_string(),
                }
            }
        };
        outcomes.push(outcome);
    }

    BatchSummary { outcomes, mode }
}

fn process_pdf(
    input: &Path,
    output: &Path,
    options: &BatchOptions,
    mode: &mut Option<CropMode>,
    decider: &mut dyn PolicyDecider,
    batch_len: usize,
) -> Result<FileSummary, CleanError> {
    let mut doc = Document::open_file(input)?;
    let report = clean(&mut doc, &options.clean)?;

    let resized = if options.resize {
        let page_mode = resolve_policy(&doc, mode, options, decider, input, batch_len)?;
        apply_resize(&mut doc, page_mode, &options.resize_options)?
    } else {
        0
    };

    write_atomically(output, |file| doc.save_to(file))?;
    Ok(FileSummary::Pdf { report, resized })
}

/// The crop mode for this document, asking the decider if the batch has
/// not settled on one and the document needs resizing.
fn resolve_policy(
    doc: &Document,
    mode: &mut Option<CropMode>,
    options: &BatchOptions,
    decider: &mut dyn PolicyDecider,
    input: &Path,
    batch_len: usize,
) -> Result<CropMode, CleanError> {
    if let Some(mode) = *mode {
        return Ok(mode);
    }
    if !needs_resizing(doc, &options.resize_options)? {
        debug!(file = %input.display(), "no resizing needed");
        return Ok(CropMode::Skip);
    }
    let chosen = match render_preview(doc) {
        Ok(Some(preview)) => decider.propose_policy(Some(&preview), input, batch_len),
        Ok(None) => CropMode::Skip,
        Err(e) => {
            warn!(file = %input.display(), error = %e, "preview failed; not resizing");
            CropMode::Skip
        }
    };
    info!(mode = %chosen, "crop mode chosen for batch");
    *mode = Some(chosen);
    Ok(chosen)
}

fn process_epub(input: &Path, output: &Path) -> Result<EpubReport, CleanError> {
    let cleaner = EpubCleaner::new()?;
    let source = File::open(input)?;
    let mut report = EpubReport::default();
    write_atomically(output, |file| {
        report = cleaner.clean(&source, file)?;
        Ok(())
    })?;
    Ok(report)
}

/// Write through a temporary file in the destination directory and move
/// it onto `target` only if `write` succeeds.
fn write_atomically<F>(target: &Path, write: F) -> Result<(), CleanError>
where
    F: FnOnce(&mut File) -> Result<(), CleanError>,
{
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(target)
        .map_err(|e| CleanError::Io(format!("cannot write {}: {}", target.display(), e.error)))?;
    Ok(())
}
