// src/infra/errors.rs — Error types for windowbench

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ScoreError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ScoreError {
    // Configuration lookups (fatal before any classification runs)
    #[error("{kind} '{key}' not found")]
    ConfigNotFound { kind: ConfigKind, key: String },

    #[error("Malformed timestamp '{value}' (expected YYYY-MM-DD HH:MM:SS)")]
    MalformedTimestamp { value: String },

    #[error("Malformed row in {}:{line}: {reason}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    // Data integrity
    #[error("Label mismatch in '{series}' at {timestamp}: label={label} disagrees with window membership")]
    LabelWindowMismatch {
        series: String,
        timestamp: String,
        label: bool,
    },

    #[error("Window in '{series}' ends before it starts: [{start}, {end}]")]
    InvalidWindow {
        series: String,
        start: String,
        end: String,
    },

    #[error("Overlapping windows in '{series}': [{first}] and [{second}]")]
    OverlappingWindows {
        series: String,
        first: String,
        second: String,
    },

    #[error("Result file for '{series}' has no ground-truth windows entry")]
    UnknownSeries { series: String },

    // Infra
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which configuration table a failed lookup was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Detector,
    Threshold,
    Profile,
}

impl std::fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConfigKind::Detector => "Detector",
            ConfigKind::Threshold => "Threshold profile",
            ConfigKind::Profile => "Cost profile",
        };
        f.write_str(name)
    }
}

impl ScoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_row(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        ScoreError::MalformedRow {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Errors that stem from the benchmark's configuration rather than from a
    /// detector's result files.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ScoreError::ConfigNotFound { .. }
                | ScoreError::InvalidWindow { .. }
                | ScoreError::OverlappingWindows { .. }
        )
    }
}
