// src/scoring/calibration.rs — Causal score calibration before thresholding
//
// A calibrator turns a series' rows into one score per row. It may only use
// rows at or before the current position. The identity calibrator keeps the
// detector's anomaly_score and is the default.

use std::collections::VecDeque;

use super::types::SeriesRecord;

/// Transforms a series' scores before they are compared to the threshold.
pub trait ScoreCalibrator: Send + Sync {
    fn name(&self) -> &str;

    /// Returns exactly `records.len()` scores. Score `i` depends only on
    /// `records[..=i]`.
    fn calibrate(&self, records: &[SeriesRecord], probation_period: usize) -> Vec<f64>;
}

/// Passes `anomaly_score` through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCalibrator;

impl ScoreCalibrator for IdentityCalibrator {
    fn name(&self) -> &str {
        "identity"
    }

    fn calibrate(&self, records: &[SeriesRecord], _probation_period: usize) -> Vec<f64> {
        records.iter().map(|r| r.anomaly_score).collect()
    }
}

/// Rows at the start of a series excluded from calibration statistics:
/// `min(floor(percent * len), percent * max_rows)`.
pub fn probation_period(percent: f64, len: usize, max_rows: usize) -> usize {
    let by_length = (percent * len as f64).floor();
    let cap = percent * max_rows as f64;
    by_length.min(cap).max(0.0) as usize
}

/// Online anomaly likelihood over raw scores.
///
/// The first half of the probation period is a learning period whose rows get
/// likelihood 0.5. The rest of the probation period only accumulates
/// statistics. After that, a normal distribution is fitted to the moving
/// averages of raw scores seen since the learning period (refitted every
/// `reestimation_period` rows) and each row's moving average is scored by its
/// tail probability. The emitted score is the log-scaled likelihood. A value
/// more than 20% of the observed range above the running maximum forces 1.0.
#[derive(Debug, Clone)]
pub struct AnomalyLikelihoodCalibrator {
    averaging_window: usize,
    reestimation_period: usize,
}

const MIN_VARIANCE: f64 = 0.0003;

impl Default for AnomalyLikelihoodCalibrator {
    fn default() -> Self {
        Self::new(10, 100)
    }
}

impl AnomalyLikelihoodCalibrator {
    pub fn new(averaging_window: usize, reestimation_period: usize) -> Self {
        Self {
            averaging_window: averaging_window.max(1),
            reestimation_period: reestimation_period.max(1),
        }
    }
}

impl ScoreCalibrator for AnomalyLikelihoodCalibrator {
    fn name(&self) -> &str {
        "anomaly-likelihood"
    }

    fn calibrate(&self, records: &[SeriesRecord], probation_period: usize) -> Vec<f64> {
        let learning_period = probation_period / 2;
        let mut averager = MovingAverage::new(self.averaging_window);
        let mut history: Vec<f64> = Vec::with_capacity(records.len());
        let mut fitted: Option<(Normal, usize)> = None;
        let mut range: Option<(f64, f64)> = None;
        let mut scores = Vec::with_capacity(records.len());

        for (i, record) in records.iter().enumerate() {
            let avg = averager.next(record.raw_score);
            history.push(avg);

            let forced = match range {
                Some((min, max)) if min != max => record.value > (max - min) * 0.2 + max,
                _ => false,
            };

            let likelihood = if i < probation_period.max(learning_period + 1) {
                0.5
            } else {
                let refit = match fitted {
                    Some((_, fitted_at)) => i - fitted_at >= self.reestimation_period,
                    None => true,
                };
                if refit {
                    fitted = Some((Normal::estimate(&history[learning_period..]), i));
                }
                let dist = fitted.map_or(Normal::default(), |(d, _)| d);
                1.0 - dist.tail_probability(avg)
            };

            scores.push(if forced { 1.0 } else { log_likelihood(likelihood) });

            range = Some(match range {
                Some((min, max)) => (min.min(record.value), max.max(record.value)),
                None => (record.value, record.value),
            });
        }

        scores
    }
}

/// Maps a likelihood in [0, 1] onto a log scale so that values very close to
/// 1.0 are spread out.
pub fn log_likelihood(likelihood: f64) -> f64 {
    (1.000_000_000_1 - likelihood).ln() / -23.025_850_929_940_457
}

#[derive(Debug, Clone, Copy)]
struct Normal {
    mean: f64,
    std_dev: f64,
}

impl Default for Normal {
    fn default() -> Self {
        Self {
            mean: 0.5,
            std_dev: MIN_VARIANCE.sqrt(),
        }
    }
}

impl Normal {
    fn estimate(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            std_dev: variance.max(MIN_VARIANCE).sqrt(),
        }
    }

    /// Upper-tail probability; values below the mean are reflected above it.
    fn tail_probability(&self, x: f64) -> f64 {
        let x = if x < self.mean { 2.0 * self.mean - x } else { x };
        let z = (x - self.mean) / self.std_dev;
        0.5 * erfc(z / std::f64::consts::SQRT_2)
    }
}

/// Complementary error function, fractional error below 1.2e-7.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Fixed-size trailing mean.
struct MovingAverage {
    window: VecDeque<f64>,
    capacity: usize,
    total: f64,
}

impl MovingAverage {
    fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            total: 0.0,
        }
    }

    fn next(&mut self, value: f64) -> f64 {
        if self.window.len() == self.capacity {
            if let Some(old) = self.window.pop_front() {
                self.total -= old;
            }
        }
        self.window.push_back(value);
        self.total += value;
        self.total / self.window.len() as f64
    }
}
