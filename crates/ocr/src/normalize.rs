use crate::config::ScanConfig;
use crate::types::ObservedRegion;

/// Turns one frame's recognizer output into the ordered line set the
/// extractor works on.
#[derive(Debug, Clone)]
pub struct LineNormalizer {
    min_confidence: f32,
    /// Stored lowercased.
    skip_words: Vec<String>,
}

impl Default for LineNormalizer {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl LineNormalizer {
    pub fn new(min_confidence: f32, skip_words: &[String]) -> Self {
        Self {
            min_confidence,
            skip_words: skip_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.min_confidence, &config.skip_words)
    }

    /// Top variant per region, confidence above the floor, whitespace
    /// stripped, skip-word lines dropped. Order is preserved.
    pub fn normalize(&self, regions: &[ObservedRegion]) -> Vec<String> {
        regions
            .iter()
            .filter_map(ObservedRegion::top_candidate)
            .filter(|line| line.confidence > self.min_confidence)
            .map(|line| line.text.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .filter(|text| !self.is_skipped(text))
            .collect()
    }

    fn is_skipped(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.skip_words.iter().any(|w| lower.contains(w.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObservedLine;

    fn regions(lines: &[(&str, f32)]) -> Vec<ObservedRegion> {
        lines
            .iter()
            .map(|(t, c)| ObservedRegion::from(ObservedLine::new(*t, *c)))
            .collect()
    }

    #[test]
    fn strips_all_whitespace() {
        let out = LineNormalizer::default().normalize(&regions(&[("홍 길\t동", 0.9), (" 1종 보통 ", 0.9)]));
        assert_eq!(out, vec!["홍길동", "1종보통"]);
    }

    #[test]
    fn drops_low_confidence_including_boundary() {
        let out = LineNormalizer::default().normalize(&regions(&[
            ("keep", 0.11),
            ("edge", 0.1),
            ("low", 0.05),
            ("also", 1.0),
        ]));
        assert_eq!(out, vec!["keep", "also"]);
    }

    #[test]
    fn drops_skip_words_regardless_of_confidence() {
        let out = LineNormalizer::default().normalize(&regions(&[
            ("Drivers License Renewal Notice", 1.0),
            ("DRIVERS", 0.9),
            ("자동차운전면허증", 0.9),
            ("licensed", 0.9),
        ]));
        assert_eq!(out, vec!["자동차운전면허증"]);
    }

    #[test]
    fn keeps_only_top_variant_and_skips_empty_regions() {
        let frame = vec![
            ObservedRegion {
                candidates: vec![ObservedLine::new("1종보통", 0.8), ObservedLine::new("1종대형", 0.7)],
            },
            ObservedRegion::default(),
            ObservedRegion {
                // A weak top variant drops the region even if a later one is strong.
                candidates: vec![ObservedLine::new("noise", 0.05), ObservedLine::new("홍길동", 0.9)],
            },
        ];
        assert_eq!(LineNormalizer::default().normalize(&frame), vec!["1종보통"]);
    }

    #[test]
    fn preserves_order() {
        let input = regions(&[("c", 0.9), ("a", 0.9), ("x", 0.01), ("b", 0.9)]);
        assert_eq!(LineNormalizer::default().normalize(&input), vec!["c", "a", "b"]);
    }

    #[test]
    fn custom_skip_words_are_case_insensitive() {
        let n = LineNormalizer::new(0.0, &["Renewal".to_string()]);
        let out = n.normalize(&regions(&[("RENEWALNOTICE", 0.5), ("License", 0.5)]));
        assert_eq!(out, vec!["License"]);
    }
}
