//! Benchmark configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Iteration counts offered to users of the benchmark
pub const ALLOWED_ITERATION_COUNTS: &[usize] = &[3, 5, 7, 10];

/// Named demo problem instances served by the solver backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemoDataset {
    /// Whole island
    #[default]
    SingaporeWide,
    /// Central region
    SingaporeCentral,
    /// East region
    SingaporeEast,
    /// West region
    SingaporeWest,
}

impl DemoDataset {
    /// Identifier used in the `/demo-data/{id}` path
    pub fn id(&self) -> &'static str {
        match self {
            DemoDataset::SingaporeWide => "SINGAPORE_WIDE",
            DemoDataset::SingaporeCentral => "SINGAPORE_CENTRAL",
            DemoDataset::SingaporeEast => "SINGAPORE_EAST",
            DemoDataset::SingaporeWest => "SINGAPORE_WEST",
        }
    }

    /// All known datasets
    pub fn all() -> &'static [DemoDataset] {
        &[
            DemoDataset::SingaporeWide,
            DemoDataset::SingaporeCentral,
            DemoDataset::SingaporeEast,
            DemoDataset::SingaporeWest,
        ]
    }
}

impl std::fmt::Display for DemoDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for DemoDataset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        DemoDataset::all()
            .iter()
            .copied()
            .find(|d| d.id() == normalized)
            .ok_or_else(|| ConfigError::UnknownDataset(s.to_string()))
    }
}

/// Configuration of a single benchmark run
///
/// Fixed once a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Number of chained solve iterations
    pub iteration_count: usize,

    /// Problem instance the first iteration solves
    pub dataset: DemoDataset,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iteration_count: 5,
            dataset: DemoDataset::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Create a config for the given iteration count and dataset
    pub fn new(iteration_count: usize, dataset: DemoDataset) -> Self {
        Self {
            iteration_count,
            dataset,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iteration_count == 0 {
            return Err(ConfigError::InvalidIterationCount(
                "iteration count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Stricter validation applied to user-facing run files
    pub fn validate_offered(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if !ALLOWED_ITERATION_COUNTS.contains(&self.iteration_count) {
            return Err(ConfigError::InvalidIterationCount(format!(
                "{} is not one of {:?}",
                self.iteration_count, ALLOWED_ITERATION_COUNTS
            )));
        }
        Ok(())
    }
}

/// How the solver-reported driving time is turned into the compared metric
///
/// The backend reports total driving time in seconds; the benchmark compares
/// an approximate distance in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPolicy {
    /// Multiplier applied to the raw metric
    pub scale: f64,

    /// Decimal places kept after scaling (`None` keeps full precision)
    pub round_decimals: Option<u32>,
}

impl Default for MetricPolicy {
    fn default() -> Self {
        Self {
            scale: 0.02,
            round_decimals: Some(1),
        }
    }
}

impl MetricPolicy {
    /// Derive the primary metric from a raw driving-time value
    pub fn primary_metric(&self, raw: f64) -> f64 {
        let scaled = raw * self.scale;
        match self.round_decimals {
            Some(decimals) => {
                let factor = 10f64.powi(decimals as i32);
                (scaled * factor).round() / factor
            }
            None => scaled,
        }
    }
}

/// Timing of the orchestration loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Interval between status queries of an asynchronous solve
    pub poll_interval: Duration,

    /// Pause between two iterations
    pub iteration_pause: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            iteration_pause: Duration::from_secs(1),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid iteration count
    #[error("Invalid iteration count: {0}")]
    InvalidIterationCount(String),

    /// Unknown dataset selector
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
}
