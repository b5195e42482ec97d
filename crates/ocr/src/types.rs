use dlscan_core::LicenseCandidate;
use serde::{Deserialize, Serialize};

/// One recognized text variant with the engine's confidence (0.0–1.0).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservedLine {
    pub text: String,
    pub confidence: f32,
}

impl ObservedLine {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence: confidence.clamp(0.0, 1.0) }
    }
}

/// A detected text region and its ranked recognition variants, best first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObservedRegion {
    pub candidates: Vec<ObservedLine>,
}

impl ObservedRegion {
    pub fn top_candidate(&self) -> Option<&ObservedLine> {
        self.candidates.first()
    }
}

impl From<ObservedLine> for ObservedRegion {
    fn from(line: ObservedLine) -> Self {
        Self { candidates: vec![line] }
    }
}

/// A frame's recognizer output as it may appear in a JSON frame dump:
/// either bare lines (top-1 only) or full regions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FrameRecord {
    Lines(Vec<ObservedLine>),
    Regions(Vec<ObservedRegion>),
}

impl FrameRecord {
    pub fn into_regions(self) -> Vec<ObservedRegion> {
        match self {
            FrameRecord::Lines(lines) => lines.into_iter().map(ObservedRegion::from).collect(),
            FrameRecord::Regions(regions) => regions,
        }
    }
}

/// Everything one frame contributes to the consensus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameExtraction {
    /// Present only when every non-date field was read.
    pub candidate: Option<LicenseCandidate>,
    /// 8-digit `YYYYMMDD` strings, in line order.
    pub dates: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_line_clamps_confidence() {
        assert_eq!(ObservedLine::new("a", 1.5).confidence, 1.0);
        assert_eq!(ObservedLine::new("a", -0.1).confidence, 0.0);
    }

    #[test]
    fn top_candidate_is_first_variant() {
        let region = ObservedRegion {
            candidates: vec![ObservedLine::new("홍길동", 0.9), ObservedLine::new("홍길둥", 0.4)],
        };
        assert_eq!(region.top_candidate().unwrap().text, "홍길동");
        assert!(ObservedRegion::default().top_candidate().is_none());
    }

    #[test]
    fn frame_record_accepts_bare_lines() {
        let json = r#"[{"text":"홍길동","confidence":0.9},{"text":"1종보통","confidence":0.8}]"#;
        let regions = serde_json::from_str::<FrameRecord>(json).unwrap().into_regions();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].top_candidate().unwrap().text, "1종보통");
    }

    #[test]
    fn frame_record_accepts_regions() {
        let json = r#"[{"candidates":[{"text":"A","confidence":0.5},{"text":"B","confidence":0.2}]}]"#;
        let regions = serde_json::from_str::<FrameRecord>(json).unwrap().into_regions();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].candidates.len(), 2);
    }
}
