// tests/corpus_test.rs — Integration test: a small corpus on disk, end to end

use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use windowbench::cli::analyze::{analyze, score, AnalyzeOptions};
use windowbench::cli::inspect::inspect;
use windowbench::cli::list::list;
use windowbench::cli::ReportFormat;
use windowbench::infra::config::Config;
use windowbench::infra::errors::ScoreError;
use windowbench::scoring::RankingOrder;

const HEADER: &str = "timestamp,value,anomaly_score,raw_score,label,S(t)_standard";

fn write(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

fn result_file(rows: &[(&str, f64, u8)]) -> String {
    let mut body = format!("{HEADER}\n");
    for (time, score, label) in rows {
        body.push_str(&format!("2014-04-10 {time},12.5,{score},0.0,{label},0.0\n"));
    }
    body
}

/// Three series:
///   realTraffic/speed.csv      two windows, one detected (2 hits) plus one false positive
///   realTraffic/occupancy.csv  one window, missed
///   realTweets/volume.csv      no result file at all, two windows
fn corpus() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(
        &root.join("labels/combined_windows.json"),
        r#"{
            "realTraffic/speed.csv": [
                ["2014-04-10 01:00:00.000000", "2014-04-10 02:00:00.000000"],
                ["2014-04-10 05:00:00.000000", "2014-04-10 06:00:00.000000"]
            ],
            "realTraffic/occupancy.csv": [
                ["2014-04-10 03:00:00.000000", "2014-04-10 04:00:00.000000"]
            ],
            "realTweets/volume.csv": [
                ["2014-04-10 07:00:00.000000", "2014-04-10 08:00:00.000000"],
                ["2014-04-10 09:00:00.000000", "2014-04-10 10:00:00.000000"]
            ]
        }"#,
    );
    write(
        &root.join("config/thresholds.json"),
        r#"{"numenta": {"standard": {"score": 52.0, "threshold": 0.6},
                         "reward_low_FN_rate": {"score": 60.0, "threshold": 0.3}},
            "skyline": {"standard": {"score": 10.0, "threshold": 0.9}}}"#,
    );
    write(
        &root.join("config/profiles.json"),
        r#"{"standard": {"CostMatrix": {"tpWeight": 1.0, "fnWeight": 1.0, "fpWeight": 0.11, "tnWeight": 1.0}},
            "reward_low_FN_rate": {"CostMatrix": {"tpWeight": 1.0, "fnWeight": 2.0, "fpWeight": 0.11, "tnWeight": 1.0}}}"#,
    );

    write(
        &root.join("results/numenta/realTraffic/numenta_speed.csv"),
        &result_file(&[
            ("00:30:00", 0.1, 0),
            ("01:10:00", 0.7, 1),
            ("01:40:00", 0.65, 1),
            ("02:30:00", 0.9, 0),
            ("05:30:00", 0.2, 1),
        ]),
    );
    write(
        &root.join("results/numenta/realTraffic/numenta_occupancy.csv"),
        &result_file(&[("03:30:00", 0.4, 1), ("04:30:00", 0.1, 0)]),
    );
    write(&root.join("results/numenta/numenta_standard_scores.csv"), "ignored\n");
    dir
}

fn options(detector: &str, profile: Option<&str>) -> AnalyzeOptions {
    AnalyzeOptions {
        detector: detector.to_string(),
        profile: profile.map(str::to_string),
        format: ReportFormat::Text,
        ranking: None,
        calibrate: false,
    }
}

#[test]
fn test_analyze_text_report() {
    let dir = corpus();
    let out = analyze(&Config::default(), Some(dir.path()), &options("numenta", None)).unwrap();

    let expected = "\
total true positives 2
detected windows 1
max positive from detected windows 1.0
undetected windows 4
max positive from undetected windows 8.0
false positives 1
max negative from fp 0.11
realTweets/volume.csv
realTraffic/occupancy.csv
realTraffic/speed.csv
";
    assert_eq!(out, expected);
}

#[test]
fn test_analyze_other_profile_changes_threshold_and_weights() {
    let dir = corpus();
    let report = score(
        &Config::default(),
        Some(dir.path()),
        &options("numenta", Some("reward_low_FN_rate")),
    )
    .unwrap();

    // threshold 0.3: occupancy's 0.4 now lands in its window
    assert_eq!(report.detected_windows, 2);
    assert_eq!(report.undetected_windows, 3);
    assert_eq!(report.true_positives, 3);
    assert!((report.max_positive_undetected - 9.0).abs() < 1e-12);
}

#[test]
fn test_analyze_ascending_from_config() {
    let dir = corpus();
    let mut config = Config::default();
    config.scoring.ranking = RankingOrder::Ascending;
    let report = score(&config, Some(dir.path()), &options("numenta", None)).unwrap();
    let ids: Vec<&str> = report
        .worst_offenders
        .iter()
        .map(|m| m.series.as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["realTraffic/occupancy.csv", "realTraffic/speed.csv", "realTweets/volume.csv"]
    );
}

#[test]
fn test_analyze_json() {
    let dir = corpus();
    let mut opts = options("numenta", None);
    opts.format = ReportFormat::Json;
    let out = analyze(&Config::default(), Some(dir.path()), &opts).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["detector"], "numenta");
    assert_eq!(value["series_scored"], 2);
    assert_eq!(value["false_positives"], 1);
}

#[test]
fn test_unknown_detector_fails_before_discovery() {
    let dir = corpus();
    let err = score(&Config::default(), Some(dir.path()), &options("htmjava", None)).unwrap_err();
    let err = err.downcast_ref::<ScoreError>().unwrap();
    assert!(matches!(err, ScoreError::ConfigNotFound { .. }));
    assert!(err.is_config_error());
}

#[test]
fn test_configured_detector_without_results_is_io_error() {
    let dir = corpus();
    let err = score(&Config::default(), Some(dir.path()), &options("skyline", None)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScoreError>(),
        Some(ScoreError::Io { .. })
    ));
}

#[test]
fn test_label_mismatch_aborts_without_report() {
    let dir = corpus();
    write(
        &dir.path().join("results/numenta/realTweets/numenta_volume.csv"),
        &result_file(&[("06:30:00", 0.1, 1)]),
    );
    let err = analyze(&Config::default(), Some(dir.path()), &options("numenta", None)).unwrap_err();
    assert!(err.to_string().contains("realTweets/volume.csv"));
}

#[test]
fn test_result_file_for_unknown_series() {
    let dir = corpus();
    write(
        &dir.path().join("results/numenta/realTraffic/numenta_travel_time.csv"),
        &result_file(&[("00:00:00", 0.1, 0)]),
    );
    let err = score(&Config::default(), Some(dir.path()), &options("numenta", None)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScoreError>(),
        Some(ScoreError::UnknownSeries { series }) if series == "realTraffic/travel_time.csv"
    ));
}

#[test]
fn test_calibrated_run_produces_report() {
    let dir = corpus();
    let mut opts = options("numenta", None);
    opts.calibrate = true;
    let report = score(&Config::default(), Some(dir.path()), &opts).unwrap();
    assert_eq!(report.total_windows(), 5);
    assert_eq!(report.series_scored, 2);
}

#[test]
fn test_inspect_series() {
    let dir = corpus();
    let out = inspect(
        &Config::default(),
        Some(dir.path()),
        "numenta",
        "realTraffic/speed.csv",
        None,
        false,
    )
    .unwrap();

    let expected = "\
realTraffic/speed.csv (threshold 0.6)
  window 1 [2014-04-10 01:00:00, 2014-04-10 02:00:00]: detected (2 detections)
    2014-04-10 01:10:00
    2014-04-10 01:40:00
  window 2 [2014-04-10 05:00:00, 2014-04-10 06:00:00]: missed (0 detections)
  false positives: 1
    2014-04-10 02:30:00
";
    assert_eq!(out, expected);
}

#[test]
fn test_inspect_unknown_series() {
    let dir = corpus();
    let err = inspect(
        &Config::default(),
        Some(dir.path()),
        "numenta",
        "realTraffic/nope.csv",
        None,
        false,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScoreError>(),
        Some(ScoreError::UnknownSeries { .. })
    ));
}

#[test]
fn test_list_detectors() {
    let dir = corpus();
    let out = list(&Config::default(), Some(dir.path())).unwrap();
    let expected = "\
Corpus: 3 series, 5 windows
Detectors:
  numenta
  skyline (no results)
";
    assert_eq!(out, expected);
}
