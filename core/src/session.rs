//! Single long-running solve with remote cancellation
//!
//! Unlike a benchmark iteration, a session starts the solve through the
//! plain `start` endpoint, keeps refreshing until the solver goes idle and
//! then loads the road-network visualization. Stopping the session also asks
//! the service to terminate the job.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{BenchError, BenchResult};
use crate::poller::ResultPoller;
use crate::signal::{RunFlag, StopSignal};
use crate::solution::{JobId, RoutePlan};
use crate::traits::SolveClient;

/// Wall time spent in each phase of a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveTimings {
    /// From submission until the solver reported idle
    pub optimisation: Duration,
    /// From solver idle until the visualization fetch returned
    pub visualization: Duration,
}

impl SolveTimings {
    /// Sum of both phases
    pub fn total(&self) -> Duration {
        self.optimisation + self.visualization
    }
}

/// Result of a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The solver finished
    Solved {
        /// Job that was solved
        job: JobId,
        /// Final solution
        solution: RoutePlan,
        /// Visualization payload, `None` if unavailable
        enrichment: Option<serde_json::Value>,
        /// Phase timings
        timings: SolveTimings,
    },
    /// The session was stopped and the remote job terminated
    Cancelled {
        /// Job that was terminated
        job: JobId,
    },
}

/// A single solve of one problem instance
pub struct SolveSession {
    client: Arc<dyn SolveClient>,
    poll_interval: Duration,
    flag: RunFlag,
}

impl SolveSession {
    /// Create a session refreshing every 2 seconds
    pub fn new(client: Arc<dyn SolveClient>) -> Self {
        Self {
            client,
            poll_interval: Duration::from_secs(2),
            flag: RunFlag::new(),
        }
    }

    /// Override the refresh interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Whether a solve is in progress
    pub fn is_running(&self) -> bool {
        self.flag.is_running()
    }

    /// Stop the solve in progress; idempotent
    pub fn stop(&self) -> bool {
        self.flag.stop()
    }

    /// Solve `problem`, invoking `on_tick` on every refresh while solving
    pub async fn solve<F>(&self, problem: &RoutePlan, on_tick: F) -> BenchResult<SessionOutcome>
    where
        F: FnMut(Duration),
    {
        let Some(guard) = self.flag.try_begin() else {
            return Err(BenchError::AlreadyRunning);
        };
        let result = self.execute(problem, guard.signal(), on_tick).await;
        drop(guard);
        result
    }

    async fn execute<F>(
        &self,
        problem: &RoutePlan,
        mut signal: StopSignal,
        on_tick: F,
    ) -> BenchResult<SessionOutcome>
    where
        F: FnMut(Duration),
    {
        let started = Instant::now();

        let job = self
            .client
            .start(problem)
            .await
            .map_err(|e| BenchError::dispatch(1, e.diagnostic()))?;
        tracing::info!(job = %job, "Solve started");

        let poller = ResultPoller::new(Arc::clone(&self.client), self.poll_interval);
        let solution = match poller.wait_until_idle(&job, &mut signal, on_tick).await {
            Ok(Some(solution)) => solution,
            Ok(None) => {
                self.terminate(&job).await;
                return Ok(SessionOutcome::Cancelled { job });
            }
            Err(e) => return Err(BenchError::poll(1, e.diagnostic())),
        };

        let optimisation = started.elapsed();
        tracing::info!(
            job = %job,
            optimisation_secs = optimisation.as_secs_f64(),
            score = solution.score.as_deref().unwrap_or_default(),
            "Optimisation complete"
        );

        let enrichment = poller.fetch_enrichment(&job).await;
        let timings = SolveTimings {
            optimisation,
            visualization: started.elapsed() - optimisation,
        };
        tracing::info!(
            job = %job,
            total_secs = timings.total().as_secs_f64(),
            visualization_secs = timings.visualization.as_secs_f64(),
            road_network = enrichment.is_some(),
            "Solve complete"
        );

        Ok(SessionOutcome::Solved {
            job,
            solution,
            enrichment,
            timings,
        })
    }

    async fn terminate(&self, job: &JobId) {
        match self.client.cancel(job).await {
            Ok(()) => tracing::info!(job = %job, "Solve terminated"),
            Err(e) => tracing::warn!(job = %job, error = %e, "Failed to terminate solve"),
        }
    }
}

impl std::fmt::Debug for SolveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveSession")
            .field("client", &self.client.name())
            .field("poll_interval", &self.poll_interval)
            .field("running", &self.flag.is_running())
            .finish()
    }
}
