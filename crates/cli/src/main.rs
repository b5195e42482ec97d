use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use dlscan_core::DriverLicense;
use dlscan_ocr::{ConsensusStatus, FrameRecord, ScanConfig, ScanSession};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ScanConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScanConfig::default(),
    };

    let record = match cli.command {
        Command::Replay { frames } => replay(&frames, &config)?,
        Command::Scan { dir, tessdata } => scan(&dir, tessdata, &config).await?,
    };

    let Some(record) = record else {
        bail!("Frames ran out before the license could be resolved");
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn replay(path: &Path, config: &ScanConfig) -> Result<Option<DriverLicense>> {
    let reader: Box<dyn BufRead> = if path == Path::new("-") {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut session = ScanSession::new(config);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: FrameRecord = serde_json::from_str(&line)
            .with_context(|| format!("Malformed frame on line {}", idx + 1))?;
        match session.process_regions(&frame.into_regions()) {
            ConsensusStatus::Resolved(record) => return Ok(Some(record)),
            ConsensusStatus::Accumulating { .. } => {}
            ConsensusStatus::Closed => break,
        }
    }
    tracing::info!(frames = session.frames_seen(), "replay finished without resolution");
    Ok(None)
}

fn frame_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

#[cfg(feature = "tesseract")]
async fn scan(dir: &Path, tessdata: Option<String>, config: &ScanConfig) -> Result<Option<DriverLicense>> {
    use dlscan_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    use dlscan_ocr::{run_scan, LicenseScanner};
    use tokio::sync::mpsc;

    let files = frame_files(dir)?;
    let scanner = LicenseScanner::new(TesseractRecognizer::korean(tessdata), config);

    // The channel decouples file reads from the OCR session.
    let (tx, rx) = mpsc::channel::<Vec<u8>>(8);
    let session = tokio::task::spawn_blocking(move || {
        tokio::runtime::Handle::current().block_on(run_scan(scanner, rx))
    });

    for path in files {
        tracing::debug!("Feeding frame: {}", path.display());
        let data = tokio::fs::read(&path).await?;
        if tx.send(data).await.is_err() {
            // Session finished early.
            break;
        }
    }
    drop(tx);

    Ok(session.await??)
}

#[cfg(not(feature = "tesseract"))]
async fn scan(dir: &Path, _tessdata: Option<String>, _config: &ScanConfig) -> Result<Option<DriverLicense>> {
    let files = frame_files(dir)?;
    bail!(
        "{} frame(s) found in {}, but dlscan was built without the `tesseract` feature",
        files.len(),
        dir.display()
    )
}
