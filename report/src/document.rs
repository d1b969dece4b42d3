//! Persisted form of a benchmark run

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vrp_bench_core::{
    deltas, ArchiveEntry, BenchmarkConfig, BenchmarkRunState, ConsistencyTier, IterationDelta,
    ResultArchive, RunPhase, RunningStatistics,
};

use crate::error::{ReportError, ReportResult};

/// Everything needed to re-display a run later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveDocument {
    /// When the document was written
    pub generated_at: DateTime<Utc>,

    /// Version of the tool that wrote it
    pub tool_version: String,

    /// Final phase of the run
    pub phase: RunPhase,

    /// Run configuration
    pub config: Option<BenchmarkConfig>,

    /// Run start
    pub started_at: Option<DateTime<Utc>>,

    /// Run end
    pub finished_at: Option<DateTime<Utc>>,

    /// Failure reason, for failed runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,

    /// Statistics over `archive`
    pub statistics: Option<RunningStatistics>,

    /// Consistency tier of `statistics`
    pub tier: Option<ConsistencyTier>,

    /// Archived iterations with full solutions
    pub archive: ResultArchive,
}

impl ArchiveDocument {
    /// Capture a run snapshot
    pub fn from_state(state: &BenchmarkRunState) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            phase: state.phase,
            config: state.config,
            started_at: state.started_at,
            finished_at: state.finished_at,
            failure: state.failure.clone(),
            statistics: state.statistics,
            tier: state.tier(),
            archive: state.archive.clone(),
        }
    }

    /// Write as pretty-printed JSON, creating parent directories
    pub fn write_json(&self, path: &Path) -> ReportResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| ReportError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|e| ReportError::io(path, e))?;
        tracing::debug!(path = %path.display(), iterations = self.archive.len(), "Wrote archive");
        Ok(())
    }

    /// Load a previously written document
    ///
    /// Statistics and tier are recomputed from the archive, so a hand-edited
    /// file cannot disagree with its own iterations.
    pub fn read_json(path: &Path) -> ReportResult<Self> {
        let file = File::open(path).map_err(|e| ReportError::io(path, e))?;
        let mut document: Self = serde_json::from_reader(BufReader::new(file))?;
        document.statistics = RunningStatistics::from_archive(&document.archive);
        document.tier = document.statistics.as_ref().map(RunningStatistics::tier);
        Ok(document)
    }

    /// Archived entry by 1-based iteration index
    pub fn entry(&self, index: usize) -> ReportResult<&ArchiveEntry> {
        self.archive
            .iteration(index)
            .ok_or(ReportError::IterationNotFound {
                index,
                available: self.archive.len(),
            })
    }

    /// Per-iteration deltas
    pub fn deltas(&self) -> Vec<IterationDelta> {
        deltas(&self.archive.metrics())
    }

    /// Run wall time in seconds
    pub fn total_run_seconds(&self) -> Option<f64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }
}
