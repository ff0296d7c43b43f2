// src/scoring/types.rs — Shared scoring types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::timestamp::format_timestamp;

pub type Timestamp = chrono::NaiveDateTime;

/// Closed interval `[start, end]` marking a ground-truth anomalous region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnomalyWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl AnomalyWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }

    pub fn overlaps(&self, other: &AnomalyWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for AnomalyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            format_timestamp(&self.start),
            format_timestamp(&self.end)
        )
    }
}

/// One window and every detection that landed inside it, in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowDetections {
    pub window: AnomalyWindow,
    pub detections: Vec<Timestamp>,
}

impl WindowDetections {
    pub fn new(window: AnomalyWindow) -> Self {
        Self {
            window,
            detections: Vec::new(),
        }
    }

    pub fn is_detected(&self) -> bool {
        !self.detections.is_empty()
    }
}

/// One row of detector output.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecord {
    pub timestamp: Timestamp,
    pub value: f64,
    pub anomaly_score: f64,
    pub raw_score: f64,
    pub label: bool,
}

/// Per-series classification output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub series: String,
    pub windows: Vec<WindowDetections>,
    pub false_positives: Vec<Timestamp>,
}

impl ClassificationResult {
    /// Every in-window detection counts, not one per window.
    pub fn true_positives(&self) -> usize {
        self.windows.iter().map(|w| w.detections.len()).sum()
    }

    pub fn detected_windows(&self) -> usize {
        self.windows.iter().filter(|w| w.is_detected()).count()
    }

    pub fn undetected_windows(&self) -> usize {
        self.windows.len() - self.detected_windows()
    }
}

/// Order of the missed-window ranking.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RankingOrder {
    /// Most missed windows first
    #[default]
    Descending,
    /// Fewest missed windows first (matches the historical analysis output)
    Ascending,
}

/// A series and how many of its windows received no detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissedWindows {
    pub series: String,
    pub undetected: usize,
}

/// Corpus-wide totals for one (detector, profile) run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub detector: String,
    pub profile: String,
    pub threshold: f64,
    pub series_scored: usize,
    pub true_positives: usize,
    pub detected_windows: usize,
    pub undetected_windows: usize,
    pub false_positives: usize,
    /// `detected_windows * tpWeight`
    pub max_positive_detected: f64,
    /// `undetected_windows * (tpWeight + fnWeight)`
    pub max_positive_undetected: f64,
    /// `false_positives * fpWeight`
    pub fp_penalty: f64,
    pub ranking: RankingOrder,
    pub worst_offenders: Vec<MissedWindows>,
}

impl AggregateReport {
    pub fn total_windows(&self) -> usize {
        self.detected_windows + self.undetected_windows
    }
}
