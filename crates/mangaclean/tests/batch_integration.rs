//! Batch driver over a directory of mixed inputs.

mod common;

use std::path::{Path, PathBuf};

use common::{PageSpec, WATERMARK, build_bytes, build_epub, manga_page, operations};
use mangaclean::{
    BatchOptions, CropMode, Document, FileOutcome, FileSummary, FixedPolicy, PolicyDecider, Preview,
    run_batch,
};

const TALL: [i64; 4] = [0, 0, 1000, 1500];

/// Answers with a fixed mode and records every question it was asked.
struct RecordingDecider {
    answer: CropMode,
    asked: Vec<(PathBuf, Option<usize>, usize)>,
}

impl PolicyDecider for RecordingDecider {
    fn propose_policy(&mut self, preview: Option<&Preview>, file: &Path, batch_len: usize) -> CropMode {
        self.asked
            .push((file.to_path_buf(), preview.map(|p| p.page_index), batch_len));
        self.answer
    }
}

fn narrow_manga() -> Vec<u8> {
    build_bytes(&[
        manga_page("Im0", 800, 1440).with_media_box(TALL),
        manga_page("Im1", 800, 1440).with_media_box(TALL),
        PageSpec::text(WATERMARK).with_media_box(TALL),
    ])
}

#[test]
fn mixed_directory_is_processed_past_failures() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("a.pdf"), narrow_manga()).unwrap();
    std::fs::write(root.join("b.epub"), build_epub()).unwrap();
    std::fs::write(root.join("broken.pdf"), b"not a pdf").unwrap();
    std::fs::write(root.join("c.pdf"), narrow_manga()).unwrap();
    std::fs::write(root.join("cover.png"), b"").unwrap();
    let notes = root.join("notes.txt");
    std::fs::write(&notes, b"").unwrap();

    let mut decider = RecordingDecider {
        answer: CropMode::FitWidth,
        asked: Vec::new(),
    };
    let summary = run_batch(
        &[root.to_path_buf(), notes, root.join("missing.pdf")],
        &BatchOptions::default(),
        &mut decider,
    );

    assert_eq!(summary.cleaned(), 3);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.skipped(), 1);
    assert_eq!(summary.mode, Some(CropMode::FitWidth));

    // Asked once, for the first PDF; after pruning it has two pages, so the
    // preview is the last one.
    assert_eq!(decider.asked, [(root.join("a.pdf"), Some(1), 4)]);

    for name in ["a_clean.pdf", "c_clean.pdf"] {
        let doc = Document::open_file(root.join(name)).unwrap();
        // The watermark-only filler page is gone.
        assert_eq!(doc.page_count(), 2);
        let ops = operations(&doc.page_content(1).unwrap());
        assert_eq!(ops[1].1, [1000.0, 0.0, 0.0, 1800.0, 0.0, -150.0]);
    }
    assert!(root.join("b_clean.epub").is_file());
    assert!(!root.join("broken_clean.pdf").exists());

    let epub = summary
        .outcomes
        .iter()
        .find_map(|o| match o {
            FileOutcome::Cleaned {
                summary: FileSummary::Epub(report),
                ..
            } => Some(report.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(epub.resources_cleaned, 1);
}

#[test]
fn fixed_mode_never_asks() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("vol.pdf");
    std::fs::write(&input, narrow_manga()).unwrap();
    let out_dir = dir.path().join("out");

    let options = BatchOptions {
        output_dir: Some(out_dir.clone()),
        mode: Some(CropMode::Skip),
        ..BatchOptions::default()
    };
    let mut decider = RecordingDecider {
        answer: CropMode::Stretch,
        asked: Vec::new(),
    };
    let summary = run_batch(&[input], &options, &mut decider);
    assert!(decider.asked.is_empty());
    assert_eq!(summary.cleaned(), 1);

    match &summary.outcomes[0] {
        FileOutcome::Cleaned {
            output,
            summary: FileSummary::Pdf { report, resized },
            ..
        } => {
            assert_eq!(output, &out_dir.join("vol_clean.pdf"));
            assert_eq!(*resized, 0);
            assert_eq!(report.removed, [2]);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn documents_that_fill_the_page_do_not_settle_the_mode() {
    let dir = tempfile::tempdir().unwrap();
    let full = dir.path().join("a.pdf");
    let narrow = dir.path().join("b.pdf");
    std::fs::write(
        &full,
        build_bytes(&[manga_page("Im0", 1000, 1500).with_media_box(TALL)]),
    )
    .unwrap();
    std::fs::write(&narrow, narrow_manga()).unwrap();

    let mut decider = RecordingDecider {
        answer: CropMode::CenterOnly,
        asked: Vec::new(),
    };
    let summary = run_batch(&[full, narrow.clone()], &BatchOptions::default(), &mut decider);
    assert_eq!(summary.cleaned(), 2);
    assert_eq!(decider.asked.len(), 1);
    assert_eq!(decider.asked[0].0, narrow);
}

#[test]
fn resizing_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("vol.pdf");
    std::fs::write(&input, narrow_manga()).unwrap();

    let options = BatchOptions {
        resize: false,
        ..BatchOptions::default()
    };
    let summary = run_batch(&[input], &options, &mut FixedPolicy(CropMode::FitWidth));
    assert_eq!(summary.mode, None);
    assert!(matches!(
        &summary.outcomes[0],
        FileOutcome::Cleaned {
            summary: FileSummary::Pdf { resized: 0, .. },
            ..
        }
    ));
}
