use std::io;
use std::path::PathBuf;

use mangaclean::{
    BatchOptions, BatchSummary, CleanOptions, CropMode, FileOutcome, FileSummary, FixedPolicy,
    ResizeOptions, run_batch,
};

use crate::cli::ModeArg;
use crate::prompt::PromptPolicy;

pub struct CleanArgs {
    pub paths: Vec<PathBuf>,
    pub mode: Option<ModeArg>,
    pub interactive: bool,
    pub output_dir: Option<PathBuf>,
    pub min_chars: usize,
    pub resize_cover: bool,
}

pub fn run(args: CleanArgs) -> Result<(), i32> {
    // An explicit mode wins; otherwise ask only when told to.
    let mode = match (args.mode, args.interactive) {
        (Some(mode), _) => Some(mode.to_crop_mode()),
        (None, true) => None,
        (None, false) => Some(CropMode::Skip),
    };
    let options = BatchOptions {
        output_dir: args.output_dir.clone(),
        mode,
        resize: true,
        clean: CleanOptions {
            min_content_chars: args.min_chars,
            ..CleanOptions::default()
        },
        resize_options: ResizeOptions {
            keep_cover: !args.resize_cover,
            ..ResizeOptions::default()
        },
    };

    let summary = match mode {
        Some(mode) => run_batch(&args.paths, &options, &mut FixedPolicy(mode)),
        None => {
            let mut prompt = PromptPolicy::new(io::stdin().lock(), io::stderr(), args.output_dir);
            run_batch(&args.paths, &options, &mut prompt)
        }
    };

    for outcome in &summary.outcomes {
        eprintln!("{}", status_line(outcome));
    }
    eprintln!("{}", summary_line(&summary));

    if summary.failed() > 0 { Err(1) } else { Ok(()) }
}

fn status_line(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Cleaned {
            input,
            output,
            summary,
        } => format!(
            "[OK] {} -> {} ({})",
            input.display(),
            output.display(),
            describe(summary)
        ),
        FileOutcome::Skipped { path, reason } => format!("[SKIP] {}: {reason}", path.display()),
        FileOutcome::Failed { path, message } => format!("[FAIL] {}: {message}", path.display()),
    }
}

fn describe(summary: &FileSummary) -> String {
    match summary {
        FileSummary::Pdf { report, resized } => format!(
            "{} pages redacted, {} removed, {} links removed, {resized} resized",
            report.pages_redacted(),
            report.removed.len(),
            report.links_removed()
        ),
        FileSummary::Epub(report) => {
            let mut text = format!("{} resources cleaned", report.resources_cleaned);
            if report.cover_restored {
                text.push_str(", cover restored");
            }
            text
        }
    }
}

fn summary_line(summary: &BatchSummary) -> String {
    let mut line = format!(
        "Done: {} cleaned, {} skipped, {} failed",
        summary.cleaned(),
        summary.skipped(),
        summary.failed()
    );
    if let Some(mode) = summary.mode {
        line.push_str(&format!(" (crop mode: {mode})"));
    }
    line
}
