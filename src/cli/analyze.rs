// src/cli/analyze.rs — Corpus-wide scoring of one detector

use std::path::Path;

use super::{calibrator, Corpus, ReportFormat};
use crate::infra::config::Config;
use crate::scoring::report;
use crate::scoring::types::{AggregateReport, RankingOrder};
use crate::scoring::{CorpusAggregator, ResultDirectory};

pub struct AnalyzeOptions {
    pub detector: String,
    pub profile: Option<String>,
    pub format: ReportFormat,
    pub ranking: Option<RankingOrder>,
    pub calibrate: bool,
}

/// Score the detector and return the rendered report.
pub fn analyze(config: &Config, root: Option<&Path>, opts: &AnalyzeOptions) -> anyhow::Result<String> {
    let report = score(config, root, opts)?;
    let rendered = match opts.format {
        ReportFormat::Text => report::render_text(&report),
        ReportFormat::Json => report::to_json(&report)? + "\n",
    };
    Ok(rendered)
}

pub fn score(
    config: &Config,
    root: Option<&Path>,
    opts: &AnalyzeOptions,
) -> anyhow::Result<AggregateReport> {
    let corpus = Corpus::load(config, root)?;
    let profile = opts
        .profile
        .as_deref()
        .unwrap_or(&config.scoring.default_profile);
    let ranking = opts.ranking.unwrap_or(config.scoring.ranking);

    let mut aggregator = CorpusAggregator::new(&corpus.windows, &corpus.table).with_ranking(ranking);
    if let Some((cal, policy)) = calibrator(&config.calibration, opts.calibrate) {
        aggregator = aggregator.with_calibration(cal, policy);
    }

    // Unknown detector/profile must fail before the results tree is walked.
    corpus.table.lookup(&opts.detector, profile)?;
    corpus.table.weights(profile)?;

    let results = ResultDirectory::discover(&corpus.paths.results_dir, &opts.detector)?;
    let report = aggregator.run(&opts.detector, profile, &results)?;
    tracing::info!(
        "Scored '{}' on {} series: {} of {} windows detected",
        report.detector,
        report.series_scored,
        report.detected_windows,
        report.total_windows()
    );
    Ok(report)
}

pub fn run_analyze(config: &Config, root: Option<&Path>, opts: &AnalyzeOptions) -> anyhow::Result<()> {
    print!("{}", analyze(config, root, opts)?);
    Ok(())
}
