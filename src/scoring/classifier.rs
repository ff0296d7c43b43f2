// src/scoring/classifier.rs — Classify one series' rows against its windows

use super::timestamp::format_timestamp;
use super::types::{AnomalyWindow, ClassificationResult, SeriesRecord, Timestamp, WindowDetections};
use crate::infra::errors::{Result, ScoreError};

/// Classifies the rows of a single series.
///
/// A row is a detection when `anomaly_score >= threshold`. Detections inside a
/// window are credited to that window; detections outside every window are
/// false positives. Rows below the threshold leave no trace.
pub struct SeriesClassifier<'a> {
    series: &'a str,
    windows: &'a [AnomalyWindow],
    threshold: f64,
}

impl<'a> SeriesClassifier<'a> {
    pub fn new(series: &'a str, windows: &'a [AnomalyWindow], threshold: f64) -> Self {
        Self {
            series,
            windows,
            threshold,
        }
    }

    /// Inclusive: a score equal to the threshold is a detection.
    pub fn is_detection(&self, score: f64) -> bool {
        score >= self.threshold
    }

    /// Index of the first window (in stored order) containing `ts`.
    pub fn membership(&self, ts: Timestamp) -> Option<usize> {
        self.windows.iter().position(|w| w.contains(ts))
    }

    /// Rows are processed in input order. Stops at the first row whose label
    /// disagrees with window membership.
    pub fn classify(&self, records: &[SeriesRecord]) -> Result<ClassificationResult> {
        let mut windows: Vec<WindowDetections> =
            self.windows.iter().copied().map(WindowDetections::new).collect();
        let mut false_positives = Vec::new();

        for record in records {
            let member = self.membership(record.timestamp);
            if record.label != member.is_some() {
                return Err(ScoreError::LabelWindowMismatch {
                    series: self.series.to_string(),
                    timestamp: format_timestamp(&record.timestamp),
                    label: record.label,
                });
            }

            if !self.is_detection(record.anomaly_score) {
                continue;
            }
            match member {
                Some(idx) => windows[idx].detections.push(record.timestamp),
                None => false_positives.push(record.timestamp),
            }
        }

        Ok(ClassificationResult {
            series: self.series.to_string(),
            windows,
            false_positives,
        })
    }
}
