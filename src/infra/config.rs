// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::paths::{self, CorpusPaths};
use crate::scoring::types::RankingOrder;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub calibration: CalibrationConfig,
}

/// Where the benchmark corpus lives. Relative overrides resolve against `root`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub root: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
    pub windows_file: Option<PathBuf>,
    pub thresholds_file: Option<PathBuf>,
    pub profiles_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_profile")]
    pub default_profile: String,
    #[serde(default)]
    pub ranking: RankingOrder,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_profile: default_profile(),
            ranking: RankingOrder::default(),
        }
    }
}

fn default_profile() -> String {
    "standard".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub enabled: bool,
    /// Fraction of each series used as the probation period.
    pub probation_percent: f64,
    /// Row count whose `probation_percent` share caps the probation period.
    pub max_probation_rows: usize,
    pub reestimation_period: usize,
    pub averaging_window: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            probation_percent: 0.15,
            max_probation_rows: 5000,
            reestimation_period: 100,
            averaging_window: 10,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let cal = &self.calibration;
        if !(cal.probation_percent > 0.0 && cal.probation_percent < 1.0) {
            anyhow::bail!(
                "calibration.probation_percent must be in (0, 1), got {}",
                cal.probation_percent
            );
        }
        if cal.reestimation_period == 0 || cal.averaging_window == 0 {
            anyhow::bail!("calibration.reestimation_period and averaging_window must be positive");
        }
        Ok(())
    }

    /// Resolve the corpus layout. `root_override` (from `--root`) wins over
    /// `paths.root`, which wins over the current directory.
    pub fn corpus_paths(&self, root_override: Option<&Path>) -> CorpusPaths {
        let root = root_override
            .map(Path::to_path_buf)
            .or_else(|| self.paths.root.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let mut layout = CorpusPaths::under(&root);
        if let Some(ref p) = self.paths.results_dir {
            layout.results_dir = paths::resolve(&root, p);
        }
        if let Some(ref p) = self.paths.windows_file {
            layout.windows_file = paths::resolve(&root, p);
        }
        if let Some(ref p) = self.paths.thresholds_file {
            layout.thresholds_file = paths::resolve(&root, p);
        }
        if let Some(ref p) = self.paths.profiles_file {
            layout.profiles_file = paths::resolve(&root, p);
        }
        layout
    }
}
