pub mod config;
pub mod consensus;
pub mod extract;
pub mod frame;
pub mod normalize;
pub mod pipeline;
pub mod recognizer;
pub mod types;

pub use config::{ConfigError, ScanConfig};
pub use consensus::{most_frequent, resolve_dates, ConsensusState, ConsensusStatus};
pub use extract::{ExtractionMiss, Extractor};
pub use frame::{inspect_frame, FrameError, FrameInfo};
pub use normalize::LineNormalizer;
pub use pipeline::{run_scan, LicenseScanner, ScanError, ScanSession};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use types::{FrameExtraction, FrameRecord, ObservedLine, ObservedRegion};
