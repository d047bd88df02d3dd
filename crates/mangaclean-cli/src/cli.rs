use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use mangaclean::CropMode;
use mangaclean::mangaclean_core::MIN_CONTENT_CHARS;

/// Remove the OceanofPDF.com watermark from manga PDF and EPUB files.
#[derive(Debug, Parser)]
#[command(name = "mangaclean", about, version)]
pub struct Cli {
    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean PDF and EPUB files, recursing into directories
    Clean {
        /// Files or directories to process
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,

        /// Crop mode for every PDF in the batch
        #[arg(long, value_enum, env = "MANGACLEAN_MODE")]
        mode: Option<ModeArg>,

        /// Ask for the crop mode once, showing a preview of the first PDF
        #[arg(long)]
        interactive: bool,

        /// Write outputs to this directory instead of beside each input
        #[arg(long, value_name = "DIR", env = "MANGACLEAN_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Watermarked pages without images and with less text than this are removed
        #[arg(long, default_value_t = MIN_CONTENT_CHARS)]
        min_chars: usize,

        /// Also redraw the first page when resizing
        #[arg(long)]
        resize_cover: bool,
    },

    /// Report what cleaning a PDF would do, without writing anything
    Inspect {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,
    },

    /// Render the preview page of a PDF to a PNG file
    Preview {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Where to write the PNG
        #[arg(long, short, value_name = "PNG")]
        out: PathBuf,
    },
}

/// Crop mode for CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Leave page images as they are
    Skip,
    /// Scale the image to the page width
    FitWidth,
    /// Scale the image to the page height
    FitHeight,
    /// Stretch the image over the whole page
    Stretch,
    /// Keep the image size, only center it
    CenterOnly,
}

impl ModeArg {
    pub fn to_crop_mode(self) -> CropMode {
        match self {
            ModeArg::Skip => CropMode::Skip,
            ModeArg::FitWidth => CropMode::FitWidth,
            ModeArg::FitHeight => CropMode::FitHeight,
            ModeArg::Stretch => CropMode::Stretch,
            ModeArg::CenterOnly => CropMode::CenterOnly,
        }
    }
}

/// Output format for the inspect subcommand.
#[derive(Debug, Clone, ValueEnum)]
pub enum TextFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}
