use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout of the 8-digit date form collected from the card (`YYYYMMDD`).
pub const DATE_FORMAT: &str = "%Y%m%d";

/// License category printed on the card.
///
/// Equality is plain variant equality. Ordering between categories is only
/// needed to break ties when a frame shows more than one category line, and
/// goes through [`LicenseType::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseType {
    TypeOneLarge,
    TypeOneNormal,
    TypeTwoNormal,
}

impl LicenseType {
    const RANKS: [(LicenseType, u8); 3] = [
        (LicenseType::TypeOneLarge, 0),
        (LicenseType::TypeOneNormal, 1),
        (LicenseType::TypeTwoNormal, 2),
    ];

    /// Tie-break priority; lower wins.
    pub fn rank(self) -> u8 {
        Self::RANKS
            .iter()
            .find(|(t, _)| *t == self)
            .map(|(_, r)| *r)
            .unwrap_or(u8::MAX)
    }

    /// The label exactly as printed on the card.
    pub fn label(self) -> &'static str {
        match self {
            LicenseType::TypeOneLarge => "1종대형",
            LicenseType::TypeOneNormal => "1종보통",
            LicenseType::TypeTwoNormal => "2종보통",
        }
    }
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LicenseType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1종대형" => Ok(LicenseType::TypeOneLarge),
            "1종보통" => Ok(LicenseType::TypeOneNormal),
            "2종보통" => Ok(LicenseType::TypeTwoNormal),
            other => Err(format!("Unknown license type: '{other}'")),
        }
    }
}

/// The non-date fields read from a single frame.
///
/// Only complete readings are ever built; dates are pooled separately by the
/// consensus engine because the card prints them without labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseCandidate {
    pub name: String,
    pub license_type: LicenseType,
    /// `NN-NN-NNNNNN-NN`
    pub license_number: String,
    /// `NNNNNN-NNNNNNN`
    pub resident_number: String,
}

/// A driver license as resolved from many frames. Any field may be absent
/// when no frame supplied evidence for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverLicense {
    pub name: Option<String>,
    pub license_type: Option<LicenseType>,
    pub license_number: Option<String>,
    pub resident_number: Option<String>,
    /// Issue date in `YYYYMMDD` form.
    pub register_date: Option<String>,
    /// Expiry date in `YYYYMMDD` form.
    pub expire_date: Option<String>,
}

impl DriverLicense {
    /// Whether every field was resolved.
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.license_type.is_some()
            && self.license_number.is_some()
            && self.resident_number.is_some()
            && self.register_date.is_some()
            && self.expire_date.is_some()
    }

    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.register_date.as_deref().and_then(parse_card_date)
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expire_date.as_deref().and_then(parse_card_date)
    }

    /// `None` when the expiry date is missing or not a real calendar date.
    pub fn is_expired_on(&self, today: NaiveDate) -> Option<bool> {
        self.expiry_date().map(|expiry| expiry < today)
    }
}

impl From<LicenseCandidate> for DriverLicense {
    fn from(c: LicenseCandidate) -> Self {
        Self {
            name: Some(c.name),
            license_type: Some(c.license_type),
            license_number: Some(c.license_number),
            resident_number: Some(c.resident_number),
            register_date: None,
            expire_date: None,
        }
    }
}

/// Parse an 8-digit `YYYYMMDD` string into a calendar date.
pub fn parse_card_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Inverse of [`parse_card_date`].
pub fn format_card_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
