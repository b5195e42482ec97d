pub mod license;

pub use license::{format_card_date, parse_card_date, DriverLicense, LicenseCandidate, LicenseType, DATE_FORMAT};
