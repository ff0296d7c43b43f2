// src/cli/inspect.rs — Per-series window breakdown

use std::collections::BTreeMap;
use std::path::Path;

use super::{calibrator, Corpus};
use crate::infra::config::Config;
use crate::infra::errors::ScoreError;
use crate::scoring::records::read_records;
use crate::scoring::report;
use crate::scoring::CorpusAggregator;

/// Classify one series and render its windows, detections and false
/// positives. The result file is located by the standard naming scheme.
pub fn inspect(
    config: &Config,
    root: Option<&Path>,
    detector: &str,
    series: &str,
    profile: Option<&str>,
    calibrate: bool,
) -> anyhow::Result<String> {
    let corpus = Corpus::load(config, root)?;
    let profile = profile.unwrap_or(&config.scoring.default_profile);
    let entry = corpus.table.lookup(detector, profile)?;

    if !corpus.windows.contains_series(series) {
        return Err(ScoreError::UnknownSeries {
            series: series.to_string(),
        }
        .into());
    }

    let path = corpus.paths.series_result_file(detector, series);
    tracing::debug!("Reading {}", path.display());
    let mut source = BTreeMap::new();
    source.insert(series.to_string(), read_records(&path)?);

    let mut aggregator = CorpusAggregator::new(&corpus.windows, &corpus.table);
    if let Some((cal, policy)) = calibrator(&config.calibration, calibrate) {
        aggregator = aggregator.with_calibration(cal, policy);
    }
    let result = aggregator.classify_series(series, &source, entry.threshold)?;
    Ok(report::render_series(&result, entry.threshold))
}

pub fn run_inspect(
    config: &Config,
    root: Option<&Path>,
    detector: &str,
    series: &str,
    profile: Option<&str>,
    calibrate: bool,
) -> anyhow::Result<()> {
    print!(
        "{}",
        inspect(config, root, detector, series, profile, calibrate)?
    );
    Ok(())
}
