use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dlscan")]
#[command(about = "Resolve a driver license from a stream of OCR frames", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// TOML file overriding scan thresholds and skip words.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Replay recognized frames from a JSON-lines dump ("-" reads stdin).
    ///
    /// Each line is one frame: an array of {"text", "confidence"} objects,
    /// or of {"candidates": [...]} regions.
    Replay { frames: PathBuf },

    /// Run image files from a directory through Tesseract, in file-name order.
    Scan {
        dir: PathBuf,
        /// Tesseract data directory (tessdata).
        #[arg(long)]
        tessdata: Option<String>,
    },
}
