// src/infra/paths.rs — Config location and benchmark corpus layout
//
// The config directory respects WINDOWBENCH_HOME for isolation; when unset it
// is ~/.windowbench/. The benchmark corpus itself lives under a root directory
// (default: the current directory) with this layout:
//
//   <root>/results/<detector>/<group>/<detector>_<name>.csv
//   <root>/labels/combined_windows.json
//   <root>/config/thresholds.json
//   <root>/config/profiles.json

use std::path::{Path, PathBuf};

/// Returns the WINDOWBENCH_HOME override, if set.
fn windowbench_home() -> Option<PathBuf> {
    std::env::var_os("WINDOWBENCH_HOME").map(PathBuf::from)
}

/// Configuration directory: $WINDOWBENCH_HOME/ or ~/.windowbench/
pub fn config_dir() -> PathBuf {
    if let Some(home) = windowbench_home() {
        return home;
    }
    match directories::BaseDirs::new() {
        Some(base) => base.home_dir().join(".windowbench"),
        None => PathBuf::from(".windowbench"),
    }
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Resolved locations of every input the scorer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPaths {
    pub results_dir: PathBuf,
    pub windows_file: PathBuf,
    pub thresholds_file: PathBuf,
    pub profiles_file: PathBuf,
}

impl CorpusPaths {
    /// Standard layout under `root`.
    pub fn under(root: &Path) -> Self {
        Self {
            results_dir: root.join("results"),
            windows_file: root.join("labels").join("combined_windows.json"),
            thresholds_file: root.join("config").join("thresholds.json"),
            profiles_file: root.join("config").join("profiles.json"),
        }
    }

    /// Directory holding one detector's per-group result directories.
    pub fn detector_results_dir(&self, detector: &str) -> PathBuf {
        self.results_dir.join(detector)
    }

    /// Result file for one series: `group/name.csv` maps to
    /// `results/<detector>/group/<detector>_name.csv`.
    pub fn series_result_file(&self, detector: &str, series: &str) -> PathBuf {
        let (group, name) = match series.rsplit_once('/') {
            Some((group, name)) => (Some(group), name),
            None => (None, series),
        };
        let mut path = self.detector_results_dir(detector);
        if let Some(group) = group {
            path.push(group);
        }
        path.push(format!("{detector}_{name}"));
        path
    }
}

/// Resolve `path` against `root` unless it is already absolute.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
