use std::sync::OnceLock;

use dlscan_core::{LicenseCandidate, LicenseType};
use regex::Regex;
use thiserror::Error;

use crate::types::FrameExtraction;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_license_number, r"\d{2}-\d{2}-\d{6}-\d{2}");
re!(re_resident_number, r"\d{6}-[1-4]\d{5}");
re!(re_license_type, r"^1종|^2종|^특수");
re!(re_date, r"^(\d{4}.\d{2}.\d{2})");

/// Lines between the license-number line and the resident-number line,
/// counting the latter. The name sits on the line in between.
const RESIDENT_OFFSET: usize = 2;

const DATE_DIGITS: usize = 8;

/// Why a frame produced no candidate. Misses are routine on a live feed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionMiss {
    #[error("no license number line")]
    NoLicenseNumber,
    #[error("no resident number line")]
    NoResidentNumber,
    #[error("resident number at line {resident_index} is not two lines after license number at line {license_index}")]
    Misaligned { license_index: usize, resident_index: usize },
    #[error("no line before the resident number")]
    NoName,
    #[error("no recognizable license type")]
    NoLicenseType,
}

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Extract one frame's candidate and raw dates from normalized lines.
    pub fn extract(lines: &[String]) -> FrameExtraction {
        let candidate = match Self::extract_candidate(lines) {
            Ok(c) => Some(c),
            Err(miss) => {
                tracing::debug!(lines = lines.len(), "frame skipped: {miss}");
                None
            }
        };
        FrameExtraction { candidate, dates: Self::extract_dates(lines) }
    }

    /// The non-date fields, or the first check that failed.
    pub fn extract_candidate(lines: &[String]) -> Result<LicenseCandidate, ExtractionMiss> {
        let (license_index, license_number) =
            first_match(lines, re_license_number()).ok_or(ExtractionMiss::NoLicenseNumber)?;
        let (resident_index, resident_number) =
            first_match(lines, re_resident_number()).ok_or(ExtractionMiss::NoResidentNumber)?;

        if resident_index == 0 || resident_index.checked_sub(license_index) != Some(RESIDENT_OFFSET) {
            return Err(ExtractionMiss::Misaligned { license_index, resident_index });
        }

        let name = lines.get(resident_index - 1).ok_or(ExtractionMiss::NoName)?;
        let license_type = Self::extract_license_type(lines).ok_or(ExtractionMiss::NoLicenseType)?;

        Ok(LicenseCandidate {
            name: name.clone(),
            license_type,
            license_number: license_number.clone(),
            resident_number: resident_number.clone(),
        })
    }

    // ── License type ──────────────────────────────────────────────────────────

    /// Category lines that map exactly to a known type; the highest-priority
    /// one wins when several are present.
    fn extract_license_type(lines: &[String]) -> Option<LicenseType> {
        lines
            .iter()
            .filter(|l| re_license_type().is_match(l))
            .filter_map(|l| l.parse::<LicenseType>().ok())
            .min_by_key(|t| t.rank())
    }

    // ── Dates ─────────────────────────────────────────────────────────────────

    /// Numeric characters of every date-prefixed line that are exactly
    /// `YYYYMMDD` long. Lines holding more than one date are dropped.
    pub fn extract_dates(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .filter(|l| re_date().is_match(l))
            .map(|l| l.chars().filter(|c| c.is_numeric()).collect::<String>())
            .filter(|digits| digits.chars().count() == DATE_DIGITS)
            .collect()
    }
}

fn first_match<'a>(lines: &'a [String], re: &Regex) -> Option<(usize, &'a String)> {
    lines.iter().enumerate().find(|(_, l)| re.is_match(l))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
