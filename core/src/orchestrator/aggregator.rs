//! Statistics over the archived metric series

use serde::{Deserialize, Serialize};

use crate::archive::ResultArchive;
use crate::consistency::ConsistencyTier;

/// Summary statistics of the primary metric across a run
///
/// Always a full recomputation from the archive; never updated incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunningStatistics {
    /// Number of metrics summarised
    pub count: usize,

    /// Lowest metric (lower is better)
    pub best: f64,

    /// Highest metric
    pub worst: f64,

    /// Arithmetic mean
    pub mean: f64,

    /// Population standard deviation
    pub std_dev: f64,

    /// Standard deviation as a percentage of the mean (0 when the mean is 0)
    pub std_dev_percent: f64,
}

impl RunningStatistics {
    /// Compute statistics over a metric series
    ///
    /// Returns `None` for an empty series.
    pub fn compute(metrics: &[f64]) -> Option<Self> {
        if metrics.is_empty() {
            return None;
        }

        let count = metrics.len();
        let n = count as f64;
        let best = metrics.iter().copied().fold(f64::INFINITY, f64::min);
        let worst = metrics.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = metrics.iter().sum::<f64>() / n;
        let variance = metrics.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let std_dev_percent = if mean > 0.0 {
            100.0 * std_dev / mean
        } else {
            0.0
        };

        Some(Self {
            count,
            best,
            worst,
            mean,
            std_dev,
            std_dev_percent,
        })
    }

    /// Compute statistics over everything archived so far
    pub fn from_archive(archive: &ResultArchive) -> Option<Self> {
        Self::compute(&archive.metrics())
    }

    /// Consistency band of these statistics
    pub fn tier(&self) -> ConsistencyTier {
        ConsistencyTier::classify(self.std_dev_percent)
    }

    /// Spread between worst and best
    pub fn range(&self) -> f64 {
        self.worst - self.best
    }
}

/// Direction of a result relative to the rest of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Matches the best result
    Best,
    /// More than 0.5 % lower than the previous result
    Improved,
    /// More than 2 % higher than the previous result
    Regressed,
    /// Anything else
    Steady,
}

impl Trend {
    /// Table marker
    pub fn marker(&self) -> &'static str {
        match self {
            Trend::Best => "BEST",
            Trend::Improved => "down",
            Trend::Regressed => "up",
            Trend::Steady => "-",
        }
    }
}

/// Percentage deltas of one result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationDelta {
    /// Change against the previous result; `None` for the first result or
    /// when the previous result is 0
    pub vs_previous: Option<f64>,

    /// Distance above the best result (0 when the best is 0)
    pub vs_best: f64,

    /// Row trend
    pub trend: Trend,
}

/// Per-result deltas for a metric series
pub fn deltas(metrics: &[f64]) -> Vec<IterationDelta> {
    let best = match RunningStatistics::compute(metrics) {
        Some(stats) => stats.best,
        None => return Vec::new(),
    };

    metrics
        .iter()
        .enumerate()
        .map(|(i, &metric)| {
            let vs_previous = i
                .checked_sub(1)
                .map(|p| metrics[p])
                .filter(|&prev| prev != 0.0)
                .map(|prev| 100.0 * (metric - prev) / prev);
            let vs_best = if best != 0.0 {
                100.0 * (metric - best) / best
            } else {
                0.0
            };
            let trend = if (metric - best).abs() < 0.1 {
                Trend::Best
            } else {
                match vs_previous {
                    Some(d) if d < -0.5 => Trend::Improved,
                    Some(d) if d > 2.0 => Trend::Regressed,
                    _ => Trend::Steady,
                }
            };
            IterationDelta {
                vs_previous,
                vs_best,
                trend,
            }
        })
        .collect()
}
