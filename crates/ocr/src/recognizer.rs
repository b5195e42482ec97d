use thiserror::Error;

use crate::types::{ObservedLine, ObservedRegion};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
}

/// Abstraction over an OCR backend.
/// Implementations accept raw PNG/JPEG frame bytes and return the detected
/// text regions in the engine's detection order.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<ObservedRegion>, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns the same pre-set regions for every frame.
pub struct MockRecognizer {
    pub regions: Vec<ObservedRegion>,
}

impl MockRecognizer {
    pub fn new(regions: Vec<ObservedRegion>) -> Self {
        Self { regions }
    }

    /// One single-variant region per `(text, confidence)` pair.
    pub fn from_lines(lines: &[(&str, f32)]) -> Self {
        Self::new(
            lines
                .iter()
                .map(|(text, confidence)| ObservedRegion::from(ObservedLine::new(*text, *confidence)))
                .collect(),
        )
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<ObservedRegion>, OcrError> {
        Ok(self.regions.clone())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use crate::types::{ObservedLine, ObservedRegion};
    use leptess::LepTess;

    /// Tesseract only reports a page-level mean confidence through this API,
    /// so every line of a frame carries the same score.
    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }

        /// Korean plus English, matching what the card prints.
        pub fn korean(data_path: Option<String>) -> Self {
            Self::new(data_path, "kor+eng")
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<ObservedRegion>, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            let confidence = lt.mean_text_conf() as f32 / 100.0;
            Ok(text
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| ObservedRegion::from(ObservedLine::new(l, confidence)))
                .collect())
        }
    }
}
