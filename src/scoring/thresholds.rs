// src/scoring/thresholds.rs — Decision thresholds and cost matrices
//
// thresholds.json: { "<detector>": { "<profile>": { "threshold": f, "score": f } } }
// profiles.json:   { "<profile>": { "CostMatrix": { "tpWeight": f, "fpWeight": f, "fnWeight": f, "tnWeight": f } } }

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::read_json;
use crate::infra::errors::{ConfigKind, Result, ScoreError};

/// Score cutoff for one (detector, profile) pair, plus the benchmark score
/// recorded alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub threshold: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostMatrix {
    pub tp_weight: f64,
    pub fp_weight: f64,
    pub fn_weight: f64,
    /// Present in the profile files but unused by the aggregate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tn_weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProfileEntry {
    #[serde(rename = "CostMatrix")]
    cost_matrix: CostMatrix,
}

type DetectorThresholds = HashMap<String, HashMap<String, ThresholdEntry>>;

#[derive(Debug, Clone, Default)]
pub struct ThresholdTable {
    thresholds: DetectorThresholds,
    profiles: HashMap<String, CostMatrix>,
}

impl ThresholdTable {
    pub fn load(thresholds_path: &Path, profiles_path: &Path) -> Result<Self> {
        let thresholds: DetectorThresholds = read_json(thresholds_path)?;
        let profiles: HashMap<String, ProfileEntry> = read_json(profiles_path)?;
        let profiles = profiles
            .into_iter()
            .map(|(name, entry)| (name, entry.cost_matrix))
            .collect::<HashMap<_, _>>();
        tracing::debug!(
            detectors = thresholds.len(),
            profiles = profiles.len(),
            "Loaded threshold table"
        );
        Ok(Self {
            thresholds,
            profiles,
        })
    }

    pub fn from_parts(
        thresholds: DetectorThresholds,
        profiles: HashMap<String, CostMatrix>,
    ) -> Self {
        Self {
            thresholds,
            profiles,
        }
    }

    pub fn lookup(&self, detector: &str, profile: &str) -> Result<ThresholdEntry> {
        let by_profile = self
            .thresholds
            .get(detector)
            .ok_or_else(|| ScoreError::ConfigNotFound {
                kind: ConfigKind::Detector,
                key: detector.to_string(),
            })?;
        by_profile
            .get(profile)
            .copied()
            .ok_or_else(|| ScoreError::ConfigNotFound {
                kind: ConfigKind::Threshold,
                key: format!("{detector}/{profile}"),
            })
    }

    pub fn weights(&self, profile: &str) -> Result<CostMatrix> {
        self.profiles
            .get(profile)
            .copied()
            .ok_or_else(|| ScoreError::ConfigNotFound {
                kind: ConfigKind::Profile,
                key: profile.to_string(),
            })
    }

    /// Detector identifiers with at least one threshold, sorted.
    pub fn detectors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.thresholds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
