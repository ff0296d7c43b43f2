// src/scoring/discovery.rs — Locate per-series detector results
//
// Results for a detector live at results/<detector>/<group>/<detector>_<name>.
// Stripping the "<detector>_" prefix recovers the series id "<group>/<name>",
// which is the key used by the windows file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::records::read_records;
use super::types::SeriesRecord;
use crate::infra::errors::{Result, ScoreError};

/// Anything that can hand the aggregator a result set: the series it covers
/// and the rows for each of them.
pub trait SeriesSource: Sync {
    /// Series identifiers, deduplicated.
    fn series(&self) -> Result<Vec<String>>;

    /// Rows for one series, in file order.
    fn rows(&self, series: &str) -> Result<Vec<SeriesRecord>>;
}

/// One discovered result file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    pub series: String,
    pub path: PathBuf,
}

/// All result files of one detector, found on disk.
#[derive(Debug, Clone)]
pub struct ResultDirectory {
    detector: String,
    files: Vec<ResultFile>,
    by_series: BTreeMap<String, Vec<PathBuf>>,
}

impl ResultDirectory {
    /// Walk `results_dir/<detector>/*/*`. Entries directly under the detector
    /// directory that are not directories are skipped, as are dotfiles.
    pub fn discover(results_dir: &Path, detector: &str) -> Result<Self> {
        let detector_dir = results_dir.join(detector);
        let mut files = Vec::new();

        for group_dir in sorted_entries(&detector_dir)? {
            if !group_dir.is_dir() {
                continue;
            }
            let Some(group) = file_name(&group_dir) else {
                continue;
            };
            for path in sorted_entries(&group_dir)? {
                if !path.is_file() {
                    continue;
                }
                let Some(name) = file_name(&path) else {
                    continue;
                };
                if name.starts_with('.') {
                    tracing::debug!("Skipping hidden file {}", path.display());
                    continue;
                }
                files.push(ResultFile {
                    series: series_id(group, name, detector),
                    path,
                });
            }
        }

        tracing::info!(
            "Discovered {} result files for '{}' under {}",
            files.len(),
            detector,
            detector_dir.display()
        );
        let mut by_series: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for file in &files {
            by_series
                .entry(file.series.clone())
                .or_default()
                .push(file.path.clone());
        }
        Ok(Self {
            detector: detector.to_string(),
            files,
            by_series,
        })
    }

    pub fn detector(&self) -> &str {
        &self.detector
    }

    pub fn files(&self) -> &[ResultFile] {
        &self.files
    }
}

impl SeriesSource for ResultDirectory {
    /// Series ids in identifier order.
    fn series(&self) -> Result<Vec<String>> {
        Ok(self.by_series.keys().cloned().collect())
    }

    /// Concatenates every file that maps to `series`, in discovery order.
    fn rows(&self, series: &str) -> Result<Vec<SeriesRecord>> {
        let paths = self
            .by_series
            .get(series)
            .ok_or_else(|| ScoreError::UnknownSeries {
                series: series.to_string(),
            })?;
        let mut rows = Vec::new();
        for path in paths {
            rows.extend(read_records(path)?);
        }
        Ok(rows)
    }
}

/// In-memory result set, keyed by series id.
impl SeriesSource for BTreeMap<String, Vec<SeriesRecord>> {
    fn series(&self) -> Result<Vec<String>> {
        Ok(self.keys().cloned().collect())
    }

    fn rows(&self, series: &str) -> Result<Vec<SeriesRecord>> {
        self.get(series)
            .cloned()
            .ok_or_else(|| ScoreError::UnknownSeries {
                series: series.to_string(),
            })
    }
}

/// Series id for a result file name inside a group directory.
pub fn series_id(group: &str, file_name: &str, detector: &str) -> String {
    let prefix = format!("{detector}_");
    let name = match file_name.strip_prefix(&prefix) {
        Some(rest) => rest,
        None => {
            tracing::warn!(
                "Result file '{}/{}' lacks the '{}' prefix; splitting at the first underscore",
                group,
                file_name,
                prefix
            );
            file_name
                .split_once('_')
                .map_or(file_name, |(_, rest)| rest)
        }
    };
    format!("{group}/{name}")
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ScoreError::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        paths.push(entry.map_err(|e| ScoreError::io(dir, e))?.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
