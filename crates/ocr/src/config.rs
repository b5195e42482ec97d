use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Tunables for a scan session. Every key is optional in TOML; missing keys
/// take the defaults below.
///
/// ```toml
/// min_confidence = 0.1
/// skip_words = ["drivers", "license"]
/// min_candidates = 10
/// min_dates = 2
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Lines at or below this confidence are dropped.
    pub min_confidence: f32,
    /// Case-insensitive substrings that mark header junk lines.
    pub skip_words: Vec<String>,
    /// Resolution needs strictly more candidates than this.
    pub min_candidates: usize,
    /// Resolution needs strictly more pooled dates than this.
    pub min_dates: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.1,
            skip_words: vec!["drivers".to_string(), "license".to_string()],
            min_candidates: 10,
            min_dates: 2,
        }
    }
}

impl ScanConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "min_confidence must be within 0.0..=1.0, got {}",
                self.min_confidence
            )));
        }
        if self.skip_words.iter().any(|w| w.trim().is_empty()) {
            return Err(ConfigError::Invalid("skip_words may not contain empty entries".into()));
        }
        Ok(())
    }
}
