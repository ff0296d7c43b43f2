// src/scoring/aggregator.rs — Corpus-wide reduction of per-series results

use std::collections::HashMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::calibration::{probation_period, IdentityCalibrator, ScoreCalibrator};
use super::classifier::SeriesClassifier;
use super::discovery::SeriesSource;
use super::thresholds::{CostMatrix, ThresholdEntry, ThresholdTable};
use super::types::{AggregateReport, ClassificationResult, MissedWindows, RankingOrder};
use super::windows::WindowStore;
use crate::infra::errors::{Result, ScoreError};

/// How the probation period passed to the calibrator is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbationPolicy {
    pub percent: f64,
    pub max_rows: usize,
}

impl Default for ProbationPolicy {
    fn default() -> Self {
        Self {
            percent: 0.15,
            max_rows: 5000,
        }
    }
}

/// Runs the classifier over every series of a result set and folds the
/// results into an [`AggregateReport`].
pub struct CorpusAggregator<'a> {
    windows: &'a WindowStore,
    table: &'a ThresholdTable,
    ranking: RankingOrder,
    calibrator: Box<dyn ScoreCalibrator>,
    probation: ProbationPolicy,
}

impl<'a> CorpusAggregator<'a> {
    pub fn new(windows: &'a WindowStore, table: &'a ThresholdTable) -> Self {
        Self {
            windows,
            table,
            ranking: RankingOrder::default(),
            calibrator: Box::new(IdentityCalibrator),
            probation: ProbationPolicy::default(),
        }
    }

    pub fn with_ranking(mut self, ranking: RankingOrder) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn with_calibration(
        mut self,
        calibrator: Box<dyn ScoreCalibrator>,
        probation: ProbationPolicy,
    ) -> Self {
        self.calibrator = calibrator;
        self.probation = probation;
        self
    }

    /// Score one detector under one profile.
    ///
    /// Threshold and weights are resolved before any series is touched, so a
    /// missing configuration entry fails without reading result files. The
    /// first failing series aborts the run.
    pub fn run(
        &self,
        detector: &str,
        profile: &str,
        source: &dyn SeriesSource,
    ) -> Result<AggregateReport> {
        let entry = self.table.lookup(detector, profile)?;
        let cost = self.table.weights(profile)?;
        let series = source.series()?;
        tracing::info!(
            "Scoring {} series for '{}' (profile '{}', threshold {}, calibrator {})",
            series.len(),
            detector,
            profile,
            entry.threshold,
            self.calibrator.name()
        );

        let results = self.classify_all(&series, source, entry.threshold)?;
        self.reduce(detector, profile, entry, cost, &results)
    }

    /// Read, calibrate and classify one series.
    pub fn classify_series(
        &self,
        series: &str,
        source: &dyn SeriesSource,
        threshold: f64,
    ) -> Result<ClassificationResult> {
        let windows = self
            .windows
            .windows(series)
            .ok_or_else(|| ScoreError::UnknownSeries {
                series: series.to_string(),
            })?;
        let mut rows = source.rows(series)?;

        let probation = probation_period(self.probation.percent, rows.len(), self.probation.max_rows);
        let scores = self.calibrator.calibrate(&rows, probation);
        for (row, score) in rows.iter_mut().zip(scores) {
            row.anomaly_score = score;
        }

        let result = SeriesClassifier::new(series, windows, threshold).classify(&rows)?;
        tracing::debug!(
            series,
            rows = rows.len(),
            tp = result.true_positives(),
            fp = result.false_positives.len(),
            "Classified series"
        );
        Ok(result)
    }

    #[cfg(not(feature = "rayon"))]
    fn classify_all(
        &self,
        series: &[String],
        source: &dyn SeriesSource,
        threshold: f64,
    ) -> Result<Vec<ClassificationResult>> {
        series
            .iter()
            .map(|id| self.classify_series(id, source, threshold))
            .collect()
    }

    #[cfg(feature = "rayon")]
    fn classify_all(
        &self,
        series: &[String],
        source: &dyn SeriesSource,
        threshold: f64,
    ) -> Result<Vec<ClassificationResult>> {
        series
            .par_iter()
            .map(|id| self.classify_series(id, source, threshold))
            .collect()
    }

    /// Pure reduction over classification results. Totals range over every
    /// window in the store: windows of series without results count as
    /// undetected. Results for the same series are merged.
    pub fn reduce(
        &self,
        detector: &str,
        profile: &str,
        entry: ThresholdEntry,
        cost: CostMatrix,
        results: &[ClassificationResult],
    ) -> Result<AggregateReport> {
        let mut hits: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut false_positives = 0usize;

        for result in results {
            let windows = self.windows.windows(&result.series).ok_or_else(|| {
                ScoreError::UnknownSeries {
                    series: result.series.clone(),
                }
            })?;
            let counts = hits
                .entry(result.series.as_str())
                .or_insert_with(|| vec![0; windows.len()]);
            for (count, window) in counts.iter_mut().zip(&result.windows) {
                *count += window.detections.len();
            }
            false_positives += result.false_positives.len();
        }

        let mut true_positives = 0usize;
        let mut detected_windows = 0usize;
        let mut undetected_windows = 0usize;
        let mut missed: Vec<MissedWindows> = Vec::new();

        for (series, windows) in self.windows.iter() {
            let counts = hits.get(series);
            let mut undetected_here = 0usize;
            for i in 0..windows.len() {
                let n = counts.map_or(0, |c| c[i]);
                true_positives += n;
                if n > 0 {
                    detected_windows += 1;
                } else {
                    undetected_here += 1;
                }
            }
            undetected_windows += undetected_here;
            if undetected_here > 0 {
                missed.push(MissedWindows {
                    series: series.to_string(),
                    undetected: undetected_here,
                });
            }
        }

        rank(&mut missed, self.ranking);

        Ok(AggregateReport {
            detector: detector.to_string(),
            profile: profile.to_string(),
            threshold: entry.threshold,
            series_scored: hits.len(),
            true_positives,
            detected_windows,
            undetected_windows,
            false_positives,
            max_positive_detected: detected_windows as f64 * cost.tp_weight,
            max_positive_undetected: undetected_windows as f64 * (cost.tp_weight + cost.fn_weight),
            fp_penalty: false_positives as f64 * cost.fp_weight,
            ranking: self.ranking,
            worst_offenders: missed,
        })
    }
}

/// Sort by missed-window count in the requested direction; ties by series id.
fn rank(missed: &mut [MissedWindows], order: RankingOrder) {
    match order {
        RankingOrder::Ascending => missed.sort_by(|a, b| {
            a.undetected
                .cmp(&b.undetected)
                .then_with(|| a.series.cmp(&b.series))
        }),
        RankingOrder::Descending => missed.sort_by(|a, b| {
            b.undetected
                .cmp(&a.undetected)
                .then_with(|| a.series.cmp(&b.series))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::errors::ConfigKind;
    use crate::scoring::timestamp::parse_timestamp;
    use crate::scoring::types::{AnomalyWindow, SeriesRecord, Timestamp};
    use std::collections::BTreeMap;

    fn ts(s: &str) -> Timestamp {
        parse_timestamp(&format!("2015-01-01 {s}")).unwrap()
    }

    fn row(time: &str, label: bool, score: f64) -> SeriesRecord {
        SeriesRecord {
            timestamp: ts(time),
            value: 1.0,
            anomaly_score: score,
            raw_score: score,
            label,
        }
    }

    fn table() -> ThresholdTable {
        let mut by_profile = HashMap::new();
        by_profile.insert(
            "standard".to_string(),
            ThresholdEntry {
                threshold: 0.5,
                score: 0.0,
            },
        );
        let mut thresholds = HashMap::new();
        thresholds.insert("det".to_string(), by_profile);
        let mut profiles = HashMap::new();
        profiles.insert(
            "standard".to_string(),
            CostMatrix {
                tp_weight: 1.0,
                fp_weight: 0.11,
                fn_weight: 1.0,
                tn_weight: Some(1.0),
            },
        );
        ThresholdTable::from_parts(thresholds, profiles)
    }

    fn store() -> WindowStore {
        let mut store = WindowStore::new();
        store
            .insert(
                "g/a.csv",
                vec![
                    AnomalyWindow::new(ts("10:00:00"), ts("10:05:00")),
                    AnomalyWindow::new(ts("11:00:00"), ts("11:05:00")),
                ],
            )
            .unwrap();
        store
            .insert("g/b.csv", vec![AnomalyWindow::new(ts("10:00:00"), ts("10:05:00"))])
            .unwrap();
        store.insert("g/c.csv", vec![]).unwrap();
        store
    }

    fn source() -> BTreeMap<String, Vec<SeriesRecord>> {
        let mut source = BTreeMap::new();
        source.insert(
            "g/a.csv".to_string(),
            vec![
                row("10:01:00", true, 0.9),
                row("10:02:00", true, 0.8),
                row("11:01:00", true, 0.1),
                row("12:00:00", false, 0.6),
            ],
        );
        source.insert(
            "g/c.csv".to_string(),
            vec![row("09:00:00", false, 0.5), row("09:05:00", false, 0.7)],
        );
        source
    }

    #[test]
    fn test_run_totals() {
        let (store, table) = (store(), table());
        let report = CorpusAggregator::new(&store, &table)
            .run("det", "standard", &source())
            .unwrap();

        assert_eq!(report.series_scored, 2);
        assert_eq!(report.true_positives, 2);
        assert_eq!(report.detected_windows, 1);
        // a's second window and b's only window (b has no results)
        assert_eq!(report.undetected_windows, 2);
        assert_eq!(report.false_positives, 3);
        assert!((report.max_positive_detected - 1.0).abs() < 1e-12);
        assert!((report.max_positive_undetected - 4.0).abs() < 1e-12);
        assert!((report.fp_penalty - 0.33).abs() < 1e-12);
        assert_eq!(report.total_windows(), store.total_windows());
    }

    #[test]
    fn test_ranking_descending_by_default() {
        let mut store = store();
        store
            .insert(
                "g/d.csv",
                vec![
                    AnomalyWindow::new(ts("01:00:00"), ts("01:05:00")),
                    AnomalyWindow::new(ts("02:00:00"), ts("02:05:00")),
                ],
            )
            .unwrap();
        let table = table();
        let report = CorpusAggregator::new(&store, &table)
            .run("det", "standard", &source())
            .unwrap();

        let order: Vec<(&str, usize)> = report
            .worst_offenders
            .iter()
            .map(|m| (m.series.as_str(), m.undetected))
            .collect();
        assert_eq!(order, vec![("g/d.csv", 2), ("g/a.csv", 1), ("g/b.csv", 1)]);
    }

    #[test]
    fn test_ranking_ascending_on_request() {
        let mut store = store();
        store
            .insert(
                "g/d.csv",
                vec![
                    AnomalyWindow::new(ts("01:00:00"), ts("01:05:00")),
                    AnomalyWindow::new(ts("02:00:00"), ts("02:05:00")),
                ],
            )
            .unwrap();
        let table = table();
        let report = CorpusAggregator::new(&store, &table)
            .with_ranking(RankingOrder::Ascending)
            .run("det", "standard", &source())
            .unwrap();

        let order: Vec<&str> = report
            .worst_offenders
            .iter()
            .map(|m| m.series.as_str())
            .collect();
        assert_eq!(order, vec!["g/a.csv", "g/b.csv", "g/d.csv"]);
        assert_eq!(report.ranking, RankingOrder::Ascending);
    }

    struct Untouchable;
    impl SeriesSource for Untouchable {
        fn series(&self) -> Result<Vec<String>> {
            panic!("series() must not be called")
        }
        fn rows(&self, _series: &str) -> Result<Vec<SeriesRecord>> {
            panic!("rows() must not be called")
        }
    }

    #[test]
    fn test_missing_threshold_fails_before_reading_rows() {
        let (store, table) = (store(), table());
        let err = CorpusAggregator::new(&store, &table)
            .run("det", "reward_low_FN_rate", &Untouchable)
            .unwrap_err();
        assert!(matches!(
            err,
            ScoreError::ConfigNotFound {
                kind: ConfigKind::Threshold,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_weights_fail_before_reading_rows() {
        let store = store();
        let mut by_profile = HashMap::new();
        by_profile.insert(
            "only_threshold".to_string(),
            ThresholdEntry {
                threshold: 0.5,
                score: 0.0,
            },
        );
        let mut thresholds = HashMap::new();
        thresholds.insert("det".to_string(), by_profile);
        let table = ThresholdTable::from_parts(thresholds, HashMap::new());

        let err = CorpusAggregator::new(&store, &table)
            .run("det", "only_threshold", &Untouchable)
            .unwrap_err();
        assert!(matches!(
            err,
            ScoreError::ConfigNotFound {
                kind: ConfigKind::Profile,
                ref key,
            } if key == "only_threshold"
        ));
    }

    #[test]
    fn test_unknown_series_in_results() {
        let (store, table) = (store(), table());
        let mut source = source();
        source.insert("g/zzz.csv".into(), vec![row("10:00:00", false, 0.1)]);
        let err = CorpusAggregator::new(&store, &table)
            .run("det", "standard", &source)
            .unwrap_err();
        assert!(matches!(err, ScoreError::UnknownSeries { ref series } if series == "g/zzz.csv"));
    }

    #[test]
    fn test_label_mismatch_aborts_run() {
        let (store, table) = (store(), table());
        let mut source = source();
        source.insert("g/b.csv".into(), vec![row("10:30:00", true, 0.1)]);
        let err = CorpusAggregator::new(&store, &table)
            .run("det", "standard", &source)
            .unwrap_err();
        assert!(matches!(err, ScoreError::LabelWindowMismatch { .. }));
    }

    #[test]
    fn test_reduce_merges_duplicate_series() {
        let (store, table) = (store(), table());
        let aggregator = CorpusAggregator::new(&store, &table);
        let a = store.windows("g/a.csv").unwrap();
        let first = SeriesClassifier::new("g/a.csv", a, 0.5)
            .classify(&[row("10:01:00", true, 0.9)])
            .unwrap();
        let second = SeriesClassifier::new("g/a.csv", a, 0.5)
            .classify(&[row("11:01:00", true, 0.9), row("10:03:00", true, 0.9)])
            .unwrap();

        let report = aggregator
            .reduce(
                "det",
                "standard",
                table.lookup("det", "standard").unwrap(),
                table.weights("standard").unwrap(),
                &[first, second],
            )
            .unwrap();
        assert_eq!(report.true_positives, 3);
        assert_eq!(report.detected_windows, 2);
        assert_eq!(report.undetected_windows, 1);
        assert_eq!(report.series_scored, 1);
    }

    #[test]
    fn test_calibrator_scores_replace_anomaly_scores() {
        struct Constant(f64);
        impl ScoreCalibrator for Constant {
            fn name(&self) -> &str {
                "constant"
            }
            fn calibrate(&self, records: &[SeriesRecord], _probation: usize) -> Vec<f64> {
                vec![self.0; records.len()]
            }
        }

        let (store, table) = (store(), table());
        let report = CorpusAggregator::new(&store, &table)
            .with_calibration(Box::new(Constant(1.0)), ProbationPolicy::default())
            .run("det", "standard", &source())
            .unwrap();
        // every row is now a detection
        assert_eq!(report.true_positives, 3);
        assert_eq!(report.false_positives, 3);
        assert_eq!(report.detected_windows, 2);
    }
}
