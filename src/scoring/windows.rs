// src/scoring/windows.rs — Ground-truth anomaly windows per series
//
// Source format (combined_windows.json):
//   { "<group>/<name>.csv": [["<start>", "<end>"], ...], ... }

use std::collections::BTreeMap;
use std::path::Path;

use super::read_json;
use super::timestamp::{format_timestamp, parse_timestamp};
use super::types::AnomalyWindow;
use crate::infra::errors::{Result, ScoreError};

type RawWindows = BTreeMap<String, Vec<(String, String)>>;

/// Per-series anomaly windows, kept in the order the source lists them.
#[derive(Debug, Clone, Default)]
pub struct WindowStore {
    series: BTreeMap<String, Vec<AnomalyWindow>>,
}

impl WindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a windows file. Any unparsable boundary aborts the load.
    pub fn load(path: &Path) -> Result<Self> {
        let raw: RawWindows = read_json(path)?;
        let store = Self::from_raw(raw)?;
        tracing::info!(
            "Loaded {} windows across {} series from {}",
            store.total_windows(),
            store.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn from_raw(raw: RawWindows) -> Result<Self> {
        let mut store = Self::new();
        for (series, bounds) in raw {
            let windows = bounds
                .iter()
                .map(|(start, end)| {
                    Ok(AnomalyWindow::new(
                        parse_timestamp(start)?,
                        parse_timestamp(end)?,
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            store.insert(series, windows)?;
        }
        Ok(store)
    }

    /// Add (or replace) one series' windows after checking that each window is
    /// well-formed and that no two windows overlap.
    pub fn insert(&mut self, series: impl Into<String>, windows: Vec<AnomalyWindow>) -> Result<()> {
        let series = series.into();
        validate(&series, &windows)?;
        self.series.insert(series, windows);
        Ok(())
    }

    pub fn windows(&self, series: &str) -> Option<&[AnomalyWindow]> {
        self.series.get(series).map(Vec::as_slice)
    }

    pub fn contains_series(&self, series: &str) -> bool {
        self.series.contains_key(series)
    }

    /// Series in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AnomalyWindow])> {
        self.series
            .iter()
            .map(|(series, windows)| (series.as_str(), windows.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn total_windows(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }
}

fn validate(series: &str, windows: &[AnomalyWindow]) -> Result<()> {
    for w in windows {
        if w.start > w.end {
            return Err(ScoreError::InvalidWindow {
                series: series.to_string(),
                start: format_timestamp(&w.start),
                end: format_timestamp(&w.end),
            });
        }
    }
    for (i, a) in windows.iter().enumerate() {
        if let Some(b) = windows[i + 1..].iter().find(|b| a.overlaps(b)) {
            return Err(ScoreError::OverlappingWindows {
                series: series.to_string(),
                first: a.to_string(),
                second: b.to_string(),
            });
        }
    }
    Ok(())
}
