//! Core traits for solver clients, problem sources and presenters
//!
//! These traits are defined in core so the orchestrator can be driven by any
//! transport. The HTTP implementations live in the vendors crate.

use crate::archive::ArchiveEntry;
use crate::config::DemoDataset;
use crate::consistency::ConsistencyTier;
use crate::metrics::IterationResult;
use crate::orchestrator::RunningStatistics;
use crate::solution::{JobId, RoutePlan, SolveOutcome};
use async_trait::async_trait;

// ============================================================================
// Solve Client Trait
// ============================================================================

/// Client for a remote routing solver
///
/// Implementations hide the transport; the orchestrator only sees the
/// classified [`SolveOutcome`] and finished [`RoutePlan`]s.
#[async_trait]
pub trait SolveClient: Send + Sync {
    /// Client identifier used in logs
    fn name(&self) -> &str;

    /// Submit a problem for a fresh solve
    ///
    /// The response is classified once, here, into a direct result or a
    /// handle to poll.
    async fn submit(&self, problem: &RoutePlan) -> Result<SolveOutcome, ClientError>;

    /// Query the current state of a job
    ///
    /// Once the job is terminal the returned plan is the finished solution.
    async fn status(&self, job: &JobId) -> Result<RoutePlan, ClientError>;

    /// Fetch the road-network visualization payload of a finished job
    async fn enrichment(&self, job: &JobId) -> Result<serde_json::Value, ClientError>;

    /// Start a long-running solve and return its job id
    async fn start(&self, problem: &RoutePlan) -> Result<JobId, ClientError>;

    /// Ask the service to terminate a running job
    async fn cancel(&self, job: &JobId) -> Result<(), ClientError>;
}

/// Source of the fixed problem instance a run starts from
#[async_trait]
pub trait ProblemSource: Send + Sync {
    /// Load the named demo problem
    async fn load(&self, dataset: DemoDataset) -> Result<RoutePlan, ClientError>;
}

/// Solver client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP/network error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status with the best available diagnostic
    #[error("Server error: {status} - {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Diagnostic extracted from the response body
        message: String,
    },

    /// The response was neither a solution nor a job handle
    #[error("Unexpected response shape: {0}")]
    UnexpectedResponseShape(String),

    /// The response could not be decoded
    #[error("Invalid payload: {0}")]
    Payload(String),
}

impl ClientError {
    /// Text suitable for showing to the user
    pub fn diagnostic(&self) -> String {
        match self {
            ClientError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Presenter Trait
// ============================================================================

/// Error returned by a presenter; logged and otherwise ignored
#[derive(Debug, Clone, thiserror::Error)]
#[error("presenter notification failed: {0}")]
pub struct PresenterError(pub String);

/// Receiver of benchmark progress
///
/// All notifications are fire-and-forget. Errors and panics raised here are
/// caught by the orchestrator and never change the run's outcome.
pub trait Presenter: Send + Sync {
    /// Free-form progress for the given iteration (0 before the first one)
    fn on_progress(
        &self,
        _iteration: usize,
        _total: usize,
        _message: &str,
    ) -> Result<(), PresenterError> {
        Ok(())
    }

    /// An iteration finished and was archived
    fn on_iteration_complete(
        &self,
        _result: &IterationResult,
        _solution: &RoutePlan,
        _statistics: &RunningStatistics,
    ) -> Result<(), PresenterError> {
        Ok(())
    }

    /// Every iteration finished
    fn on_run_complete(
        &self,
        _statistics: &RunningStatistics,
        _tier: ConsistencyTier,
    ) -> Result<(), PresenterError> {
        Ok(())
    }

    /// The run aborted
    fn on_run_failed(&self, _reason: &str) -> Result<(), PresenterError> {
        Ok(())
    }

    /// A past iteration was selected for display again
    fn on_replay(&self, _entry: &ArchiveEntry) -> Result<(), PresenterError> {
        Ok(())
    }
}

/// Presenter that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {}
