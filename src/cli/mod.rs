// src/cli/mod.rs — CLI definition (clap derive)

pub mod analyze;
pub mod inspect;
pub mod list;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::infra::config::{CalibrationConfig, Config};
use crate::infra::paths::CorpusPaths;
use crate::scoring::calibration::{AnomalyLikelihoodCalibrator, ScoreCalibrator};
use crate::scoring::types::RankingOrder;
use crate::scoring::{ProbationPolicy, ThresholdTable, WindowStore};

#[derive(Parser)]
#[command(
    name = "windowbench",
    about = "Score anomaly detector results against labeled windows",
    version
)]
pub struct Cli {
    /// Corpus root holding results/, labels/ and config/
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log per-series progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate a detector's results over the whole corpus
    Analyze {
        /// Detector whose results are scored
        #[arg(short, long)]
        detector: String,
        /// Cost profile (defaults to scoring.default_profile)
        #[arg(short, long)]
        profile: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        /// Order of the missed-window ranking (defaults to scoring.ranking)
        #[arg(long, value_enum)]
        ranking: Option<RankingOrder>,
        /// Replace anomaly scores with calibrated likelihoods before thresholding
        #[arg(long)]
        calibrate: bool,
    },
    /// Show window-by-window detections for one series
    Inspect {
        #[arg(short, long)]
        detector: String,
        /// Series id, e.g. realKnownCause/nyc_taxi.csv
        #[arg(short, long)]
        series: String,
        #[arg(short, long)]
        profile: Option<String>,
        #[arg(long)]
        calibrate: bool,
    },
    /// List configured detectors and the size of the corpus
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Ground truth and thresholds for one corpus.
pub struct Corpus {
    pub paths: CorpusPaths,
    pub windows: WindowStore,
    pub table: ThresholdTable,
}

impl Corpus {
    pub fn load(config: &Config, root: Option<&Path>) -> anyhow::Result<Self> {
        let paths = config.corpus_paths(root);
        tracing::debug!("Corpus layout: {:?}", paths);
        let windows = WindowStore::load(&paths.windows_file)?;
        let table = ThresholdTable::load(&paths.thresholds_file, &paths.profiles_file)?;
        Ok(Self {
            paths,
            windows,
            table,
        })
    }
}

/// Calibrator selected by the `--calibrate` flag and the `[calibration]`
/// section. `None` keeps the detector's own scores.
pub fn calibrator(
    calibration: &CalibrationConfig,
    flag: bool,
) -> Option<(Box<dyn ScoreCalibrator>, ProbationPolicy)> {
    if !(flag || calibration.enabled) {
        return None;
    }
    let calibrator = AnomalyLikelihoodCalibrator::new(
        calibration.averaging_window,
        calibration.reestimation_period,
    );
    let policy = ProbationPolicy {
        percent: calibration.probation_percent,
        max_rows: calibration.max_probation_rows,
    };
    Some((Box::new(calibrator), policy))
}
