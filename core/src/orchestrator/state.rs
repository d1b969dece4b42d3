//! Observable state of a benchmark run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::archive::ResultArchive;
use crate::config::BenchmarkConfig;
use crate::consistency::ConsistencyTier;

use super::aggregator::RunningStatistics;

/// Lifecycle phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// No run has started yet
    #[default]
    Idle,
    /// Iterations are being executed
    Running,
    /// Every iteration finished
    Completed,
    /// The run flag was cleared before the last iteration
    Stopped,
    /// Setup, dispatch or polling failed
    Failed,
}

impl RunPhase {
    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunPhase::Completed | RunPhase::Stopped | RunPhase::Failed
        )
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunPhase::Idle => "idle",
            RunPhase::Running => "running",
            RunPhase::Completed => "completed",
            RunPhase::Stopped => "stopped",
            RunPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Snapshot of a run
///
/// The archive and statistics stay readable after the run ends and are only
/// reset when the next run starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRunState {
    /// Lifecycle phase
    pub phase: RunPhase,

    /// Whether the run flag is set
    pub running: bool,

    /// 1-based index of the iteration in progress (0 before the first)
    pub current_iteration: usize,

    /// Configuration of the current or last run
    pub config: Option<BenchmarkConfig>,

    /// Archived iterations
    pub archive: ResultArchive,

    /// Statistics over `archive`
    pub statistics: Option<RunningStatistics>,

    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run ended
    pub finished_at: Option<DateTime<Utc>>,

    /// Failure reason of a failed run
    pub failure: Option<String>,
}

impl BenchmarkRunState {
    /// Fresh state for a run that is starting now
    pub(crate) fn starting(config: BenchmarkConfig) -> Self {
        Self {
            phase: RunPhase::Running,
            running: true,
            config: Some(config),
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Consistency tier of the current statistics
    pub fn tier(&self) -> Option<ConsistencyTier> {
        self.statistics.as_ref().map(RunningStatistics::tier)
    }

    /// Wall time between start and end of the run
    pub fn total_run_time(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Number of iterations the run was configured for
    pub fn planned_iterations(&self) -> usize {
        self.config.map(|c| c.iteration_count).unwrap_or_default()
    }
}
