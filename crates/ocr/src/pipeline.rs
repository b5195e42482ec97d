use dlscan_core::DriverLicense;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::ScanConfig;
use crate::consensus::{ConsensusState, ConsensusStatus};
use crate::extract::Extractor;
use crate::frame::{self, FrameError};
use crate::normalize::LineNormalizer;
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::{FrameExtraction, ObservedRegion};

/// Faults that end a scan session. Extraction misses never show up here.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Frame rejected: {0}")]
    Frame(#[from] FrameError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Normalize → extract → accumulate, for frames that were already recognized.
///
/// Owns the consensus state of exactly one scan.
pub struct ScanSession {
    normalizer: LineNormalizer,
    consensus: ConsensusState,
    frames_seen: usize,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl ScanSession {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            normalizer: LineNormalizer::from_config(config),
            consensus: ConsensusState::from_config(config),
            frames_seen: 0,
        }
    }

    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    pub fn consensus(&self) -> &ConsensusState {
        &self.consensus
    }

    pub fn is_finished(&self) -> bool {
        self.consensus.is_closed()
    }

    /// The stateless half of the pipeline; safe to run off the session's thread.
    pub fn extract_frame(normalizer: &LineNormalizer, regions: &[ObservedRegion]) -> FrameExtraction {
        let lines = normalizer.normalize(regions);
        Extractor::extract(&lines)
    }

    pub fn process_regions(&mut self, regions: &[ObservedRegion]) -> ConsensusStatus {
        if self.is_finished() {
            return ConsensusStatus::Closed;
        }
        self.frames_seen += 1;
        let extraction = Self::extract_frame(&self.normalizer, regions);
        self.accept(extraction)
    }

    /// Fold in an extraction produced elsewhere, e.g. on a worker thread.
    pub fn accept(&mut self, extraction: FrameExtraction) -> ConsensusStatus {
        let status = self.consensus.accumulate(extraction);
        if let ConsensusStatus::Accumulating { candidates, dates } = status {
            tracing::debug!(frame = self.frames_seen, candidates, dates, "frame accumulated");
        }
        status
    }

    fn fail(&mut self) {
        self.consensus.close();
    }
}

/// Orchestrates: frame check → OCR → normalize → extract → consensus.
pub struct LicenseScanner<R: OcrBackend> {
    recognizer: R,
    session: ScanSession,
}

impl<R: OcrBackend> LicenseScanner<R> {
    pub fn new(recognizer: R, config: &ScanConfig) -> Self {
        Self { recognizer, session: ScanSession::new(config) }
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    /// Process one encoded frame (PNG/JPEG from the camera).
    ///
    /// An input fault closes the session and is returned once; later frames
    /// report [`ConsensusStatus::Closed`].
    pub fn process_frame(&mut self, data: &[u8]) -> Result<ConsensusStatus, ScanError> {
        if self.session.is_finished() {
            return Ok(ConsensusStatus::Closed);
        }
        let regions = match self.recognize(data) {
            Ok(regions) => regions,
            Err(e) => {
                tracing::warn!("scan aborted: {e}");
                self.session.fail();
                return Err(e);
            }
        };
        Ok(self.session.process_regions(&regions))
    }

    fn recognize(&self, data: &[u8]) -> Result<Vec<ObservedRegion>, ScanError> {
        frame::inspect_frame(data)?;
        Ok(self.recognizer.recognize(data)?)
    }
}

/// Drive a scanner from a frame feed until it resolves, faults, or the
/// sender side hangs up. `Ok(None)` means the feed ended first.
pub async fn run_scan<R: OcrBackend>(
    mut scanner: LicenseScanner<R>,
    mut frames: mpsc::Receiver<Vec<u8>>,
) -> Result<Option<DriverLicense>, ScanError> {
    while let Some(data) = frames.recv().await {
        match scanner.process_frame(&data)? {
            ConsensusStatus::Resolved(record) => return Ok(Some(record)),
            ConsensusStatus::Accumulating { .. } => {}
            ConsensusStatus::Closed => break,
        }
    }
    tracing::info!(
        frames = scanner.session().frames_seen(),
        "frame feed ended before the license resolved"
    );
    Ok(None)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::MockRecognizer;
    use crate::types::ObservedLine;
    use dlscan_core::LicenseType;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    const CARD: &[(&str, f32)] = &[
        ("자동차운전면허증", 0.9),
        ("Drivers License", 0.95),
        ("1종 보통", 0.8),
        ("12-34-567890-12", 0.9),
        ("홍길동", 0.9),
        ("123456-1234567", 0.9),
        ("2023.01.15", 0.7),
        ("2025.01.15", 0.7),
    ];

    fn card_regions() -> Vec<ObservedRegion> {
        CARD.iter()
            .map(|(t, c)| ObservedRegion::from(ObservedLine::new(*t, *c)))
            .collect()
    }

    struct FailingRecognizer;

    impl OcrBackend for FailingRecognizer {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<ObservedRegion>, OcrError> {
            Err(OcrError::Engine("request could not be performed".into()))
        }
    }

    #[test]
    fn session_resolves_after_eleven_frames() {
        let mut session = ScanSession::default();
        let regions = card_regions();
        for _ in 0..10 {
            assert!(matches!(session.process_regions(&regions), ConsensusStatus::Accumulating { .. }));
        }
        let ConsensusStatus::Resolved(record) = session.process_regions(&regions) else {
            panic!("expected resolution on the 11th frame");
        };
        assert_eq!(record.name.as_deref(), Some("홍길동"));
        assert_eq!(record.license_type, Some(LicenseType::TypeOneNormal));
        assert_eq!(record.register_date.as_deref(), Some("20230115"));
        assert_eq!(record.expire_date.as_deref(), Some("20250115"));
        assert!(session.is_finished());
        assert_eq!(session.process_regions(&regions), ConsensusStatus::Closed);
        assert_eq!(session.frames_seen(), 11);
    }

    #[test]
    fn header_lines_do_not_shift_layout() {
        let extraction = ScanSession::extract_frame(&LineNormalizer::default(), &card_regions());
        assert!(extraction.candidate.is_some());
        assert_eq!(extraction.dates, vec!["20230115", "20250115"]);
    }

    #[test]
    fn scanner_processes_encoded_frames() {
        let mut scanner = LicenseScanner::new(MockRecognizer::new(card_regions()), &ScanConfig::default());
        let status = scanner.process_frame(&tiny_png()).unwrap();
        assert_eq!(status, ConsensusStatus::Accumulating { candidates: 1, dates: 2 });
    }

    #[test]
    fn malformed_frame_is_fatal() {
        let mut scanner = LicenseScanner::new(MockRecognizer::new(card_regions()), &ScanConfig::default());
        let err = scanner.process_frame(b"garbage").unwrap_err();
        assert!(matches!(err, ScanError::Frame(_)));
        // Later good frames are ignored.
        assert_eq!(scanner.process_frame(&tiny_png()).unwrap(), ConsensusStatus::Closed);
        assert!(scanner.session().consensus().candidates().is_empty());
    }

    #[test]
    fn engine_failure_is_fatal() {
        let mut scanner = LicenseScanner::new(FailingRecognizer, &ScanConfig::default());
        assert!(matches!(scanner.process_frame(&tiny_png()), Err(ScanError::Ocr(_))));
        assert!(scanner.session().is_finished());
    }

    #[tokio::test]
    async fn run_scan_emits_one_record() {
        let (tx, rx) = mpsc::channel(32);
        let scanner = LicenseScanner::new(MockRecognizer::new(card_regions()), &ScanConfig::default());
        let handle = tokio::spawn(run_scan(scanner, rx));

        let frame = tiny_png();
        for _ in 0..11 {
            tx.send(frame.clone()).await.unwrap();
        }

        let record = handle.await.unwrap().unwrap().expect("record");
        assert_eq!(record.license_number.as_deref(), Some("12-34-567890-12"));
        assert_eq!(record.resident_number.as_deref(), Some("123456-1234567"));
    }

    #[tokio::test]
    async fn run_scan_returns_none_when_feed_ends() {
        let (tx, rx) = mpsc::channel(8);
        let scanner = LicenseScanner::new(MockRecognizer::new(card_regions()), &ScanConfig::default());
        for _ in 0..3 {
            tx.send(tiny_png()).await.unwrap();
        }
        drop(tx);
        assert_eq!(run_scan(scanner, rx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn run_scan_propagates_input_fault() {
        let (tx, rx) = mpsc::channel(8);
        let scanner = LicenseScanner::new(MockRecognizer::new(card_regions()), &ScanConfig::default());
        tx.send(Vec::new()).await.unwrap();
        drop(tx);
        assert!(matches!(run_scan(scanner, rx).await, Err(ScanError::Frame(FrameError::Empty))));
    }
}
