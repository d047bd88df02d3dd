//! mangaclean: Strip the OceanofPDF.com watermark from manga PDFs and EPUBs.
//!
//! This is the public API facade crate. It re-exports types from
//! mangaclean-core and uses mangaclean-parse for PDF reading and content
//! interpretation.
//!
//! # Architecture
//!
//! - **mangaclean-core**: Backend-independent data types and decisions
//! - **mangaclean-parse**: lopdf backend and content stream interpreter
//! - **mangaclean** (this crate): Cleaning pipeline, resizer, EPUB cleaner
//!   and the batch driver
//!
//! # Example
//!
//! ```ignore
//! use mangaclean::{CleanOptions, Document, clean};
//!
//! let mut doc = Document::open_file("vol01.pdf")?;
//! let report = clean(&mut doc, &CleanOptions::default())?;
//! println!("{} pages redacted, {} removed", report.pages_redacted(), report.removed.len());
//! doc.save_to(&mut std::fs::File::create("vol01_clean.pdf")?)?;
//! ```

pub mod batch;
mod clean;
mod document;
pub mod epub;
pub mod preview;
pub mod redact;
pub mod resize;
mod scan;

pub use batch::{
    BatchOptions, BatchSummary, FileKind, FileOutcome, FileSummary, FixedPolicy, Inputs,
    PolicyDecider, collect_inputs, output_path, run_batch,
};
pub use clean::{clean, inspect};
pub use document::Document;
pub use epub::{EpubCleaner, EpubReport};
pub use preview::{Preview, render_page, render_preview};
pub use redact::{cover_operations, redact_page};
pub use resize::{apply_resize, dominant_image, needs_resizing};
pub use scan::{PageScan, scan_page};

pub use mangaclean_core::{
    BBox, CleanError, CleanOptions, CleanReport, CoverRect, CropMode, ImageInfo, MediaBox,
    PageDisposition, PageReport, Placement, ResizeOptions, ScanWarning, Scanned, TextRun,
    WarningCode, WatermarkArea,
};

pub use mangaclean_core;
pub use mangaclean_parse;
