// src/scoring/mod.rs — Window-based scoring of detector results

pub mod aggregator;
pub mod calibration;
pub mod classifier;
pub mod discovery;
pub mod records;
pub mod report;
pub mod thresholds;
pub mod timestamp;
pub mod types;
pub mod windows;

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::infra::errors::{Result, ScoreError};

pub use aggregator::{CorpusAggregator, ProbationPolicy};
pub use classifier::SeriesClassifier;
pub use discovery::{ResultDirectory, SeriesSource};
pub use thresholds::{CostMatrix, ThresholdEntry, ThresholdTable};
pub use types::{AggregateReport, AnomalyWindow, ClassificationResult, RankingOrder, SeriesRecord};
pub use windows::WindowStore;

/// Read and deserialize a JSON configuration file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoreError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| ScoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}
