//! Run-level consistency classification
//!
//! Fixed policy thresholds over the final relative standard deviation. The
//! tier is reported next to the statistics and never changes them.

use serde::{Deserialize, Serialize};

/// Relative standard deviation above which a run is high risk
pub const HIGH_VARIANCE_PERCENT: f64 = 15.0;

/// Relative standard deviation above which a run needs tuning
pub const MODERATE_VARIANCE_PERCENT: f64 = 10.0;

/// Consistency band of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyTier {
    /// Relative std dev <= 10 %
    Acceptable,
    /// Relative std dev in (10 %, 15 %]
    ModerateVariance,
    /// Relative std dev > 15 %
    HighVariance,
}

impl ConsistencyTier {
    /// Classify a relative standard deviation (percent of mean)
    pub fn classify(std_dev_percent: f64) -> Self {
        if std_dev_percent > HIGH_VARIANCE_PERCENT {
            ConsistencyTier::HighVariance
        } else if std_dev_percent > MODERATE_VARIANCE_PERCENT {
            ConsistencyTier::ModerateVariance
        } else {
            ConsistencyTier::Acceptable
        }
    }

    /// Short headline
    pub fn label(&self) -> &'static str {
        match self {
            ConsistencyTier::Acceptable => "EXCELLENT CONSISTENCY",
            ConsistencyTier::ModerateVariance => "MODERATE VARIANCE - NEEDS TUNING",
            ConsistencyTier::HighVariance => "HIGH VARIANCE - PRODUCTION RISK",
        }
    }

    /// One-sentence assessment
    pub fn assessment(&self) -> &'static str {
        match self {
            ConsistencyTier::Acceptable => {
                "The solver shows excellent consistency suitable for production use."
            }
            ConsistencyTier::ModerateVariance => {
                "Variance is borderline. Consider tuning the solver configuration for better consistency."
            }
            ConsistencyTier::HighVariance => {
                "High variance indicates algorithmic instability. Fix the solver configuration before production."
            }
        }
    }

    /// Whether results are stable enough to ship
    pub fn is_production_ready(&self) -> bool {
        matches!(self, ConsistencyTier::Acceptable)
    }
}

impl std::fmt::Display for ConsistencyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
