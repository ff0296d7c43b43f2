// src/cli/list.rs — Configured detectors and corpus summary

use std::fmt::Write as _;
use std::path::Path;

use super::Corpus;
use crate::infra::config::Config;

pub fn list(config: &Config, root: Option<&Path>) -> anyhow::Result<String> {
    let corpus = Corpus::load(config, root)?;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Corpus: {} series, {} windows",
        corpus.windows.len(),
        corpus.windows.total_windows()
    );
    let _ = writeln!(out, "Detectors:");
    for detector in corpus.table.detectors() {
        let has_results = corpus.paths.detector_results_dir(detector).is_dir();
        let _ = writeln!(
            out,
            "  {detector}{}",
            if has_results { "" } else { " (no results)" }
        );
    }
    Ok(out)
}

pub fn run_list(config: &Config, root: Option<&Path>) -> anyhow::Result<()> {
    print!("{}", list(config, root)?);
    Ok(())
}
