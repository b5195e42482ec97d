use std::collections::HashMap;
use std::hash::Hash;

use dlscan_core::{DriverLicense, LicenseCandidate};

use crate::config::ScanConfig;
use crate::types::FrameExtraction;

/// Where a session stands after a frame has been accumulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsensusStatus {
    /// Still collecting evidence.
    Accumulating { candidates: usize, dates: usize },
    /// This frame crossed both thresholds. Emitted once per session.
    Resolved(DriverLicense),
    /// The session already resolved or failed; the frame was ignored.
    Closed,
}

/// Cross-frame evidence for one scan session.
///
/// Candidates and dates are append-only. The state resolves at most once;
/// a new scan needs a new `ConsensusState`.
#[derive(Debug, Clone)]
pub struct ConsensusState {
    min_candidates: usize,
    min_dates: usize,
    candidates: Vec<LicenseCandidate>,
    date_pool: Vec<String>,
    closed: bool,
}

impl Default for ConsensusState {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl ConsensusState {
    pub fn new(min_candidates: usize, min_dates: usize) -> Self {
        Self {
            min_candidates,
            min_dates,
            candidates: Vec::new(),
            date_pool: Vec::new(),
            closed: false,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.min_candidates, config.min_dates)
    }

    pub fn candidates(&self) -> &[LicenseCandidate] {
        &self.candidates
    }

    pub fn date_pool(&self) -> &[String] {
        &self.date_pool
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Stop accepting frames without resolving.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Strictly more candidates and strictly more dates than the thresholds.
    pub fn is_ready(&self) -> bool {
        self.candidates.len() > self.min_candidates && self.date_pool.len() > self.min_dates
    }

    /// Fold one frame in; resolves on the first frame that makes the state ready.
    pub fn accumulate(&mut self, frame: FrameExtraction) -> ConsensusStatus {
        if self.closed {
            return ConsensusStatus::Closed;
        }
        if let Some(candidate) = frame.candidate {
            self.candidates.push(candidate);
        }
        self.date_pool.extend(frame.dates);

        if !self.is_ready() {
            return ConsensusStatus::Accumulating {
                candidates: self.candidates.len(),
                dates: self.date_pool.len(),
            };
        }

        self.closed = true;
        let record = self.resolve();
        tracing::info!(
            candidates = self.candidates.len(),
            dates = self.date_pool.len(),
            "license resolved"
        );
        ConsensusStatus::Resolved(record)
    }

    /// Plurality vote per field over everything accumulated so far.
    /// Never fails; fields without evidence stay `None`.
    pub fn resolve(&self) -> DriverLicense {
        let (register_date, expire_date) = resolve_dates(&self.date_pool);
        DriverLicense {
            name: most_frequent(self.candidates.iter().map(|c| &c.name)).cloned(),
            license_type: most_frequent(self.candidates.iter().map(|c| c.license_type)),
            license_number: most_frequent(self.candidates.iter().map(|c| &c.license_number)).cloned(),
            resident_number: most_frequent(self.candidates.iter().map(|c| &c.resident_number)).cloned(),
            register_date,
            expire_date,
        }
    }
}

/// The value with the highest count. On a tie, the value seen first in
/// input order wins.
pub fn most_frequent<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut order: Vec<T> = Vec::new();
    for v in values {
        let count = counts.entry(v.clone()).or_insert(0);
        if *count == 0 {
            order.push(v);
        }
        *count += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for v in order {
        let count = counts[&v];
        if best.as_ref().map_or(true, |(_, max)| count > *max) {
            best = Some((v, count));
        }
    }
    best.map(|(v, _)| v)
}

/// Pick register and expiry dates from the pooled 8-digit strings.
///
/// The three most frequent values are taken in turn, the middle one after
/// sorting is discarded. The second removal deletes `first` again rather than
/// `second`, so `third` always repeats `second`; callers rely on this exact
/// selection.
pub fn resolve_dates(pool: &[String]) -> (Option<String>, Option<String>) {
    let mut pool: Vec<&String> = pool.iter().collect();

    let first = most_frequent(pool.iter().copied());
    pool.retain(|d| Some(*d) != first);
    let second = most_frequent(pool.iter().copied());
    pool.retain(|d| Some(*d) != first);
    let third = most_frequent(pool.iter().copied());

    // `None` orders before any date, like an empty string would.
    let mut picked = [first, second, third];
    picked.sort();
    let [register, _, expire] = picked;
    (register.cloned(), expire.cloned())
}
