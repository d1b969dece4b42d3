//! Status polling for asynchronously solved jobs

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::signal::StopSignal;
use crate::solution::{JobId, RoutePlan};
use crate::traits::{ClientError, SolveClient};

/// Result of polling a job
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The job went idle; its last status payload is the solution
    Finished {
        /// Finished solution
        solution: RoutePlan,
        /// Visualization payload, `None` if it could not be fetched
        enrichment: Option<serde_json::Value>,
    },
    /// The run flag was cleared before the job finished
    Cancelled,
}

/// Polls a job's status on a fixed cadence until it stops solving
pub struct ResultPoller {
    client: Arc<dyn SolveClient>,
    interval: Duration,
}

impl ResultPoller {
    /// Create a poller querying every `interval`
    pub fn new(client: Arc<dyn SolveClient>, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Polling cadence
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until the job is idle, then fetch its enrichment
    ///
    /// `on_tick` is invoked with the elapsed polling time on every tick where
    /// the job is still active. A failing status query ends polling with the
    /// error; a failing enrichment fetch does not.
    pub async fn poll<F>(
        &self,
        job: &JobId,
        stop: &mut StopSignal,
        on_tick: F,
    ) -> Result<PollOutcome, ClientError>
    where
        F: FnMut(Duration),
    {
        match self.wait_until_idle(job, stop, on_tick).await? {
            Some(solution) => {
                let enrichment = self.fetch_enrichment(job).await;
                Ok(PollOutcome::Finished {
                    solution,
                    enrichment,
                })
            }
            None => Ok(PollOutcome::Cancelled),
        }
    }

    /// Poll until the job is idle and return its final status payload
    ///
    /// Returns `Ok(None)` when stopped. Each tick waits one interval before
    /// querying, so the first query happens one interval after the call.
    pub async fn wait_until_idle<F>(
        &self,
        job: &JobId,
        stop: &mut StopSignal,
        mut on_tick: F,
    ) -> Result<Option<RoutePlan>, ClientError>
    where
        F: FnMut(Duration),
    {
        let started = Instant::now();
        let mut ticks = 0usize;

        loop {
            if stop.sleep(self.interval).await {
                tracing::debug!(job = %job, ticks, "Polling cancelled");
                return Ok(None);
            }

            let plan = self.client.status(job).await?;
            ticks += 1;

            // An in-flight query is never aborted, but its answer is
            // discarded once the flag has been cleared.
            if stop.is_stopped() {
                tracing::debug!(job = %job, ticks, "Polling cancelled after status query");
                return Ok(None);
            }

            if plan.is_solving() {
                tracing::debug!(
                    job = %job,
                    ticks,
                    status = plan.solver_status.as_deref().unwrap_or_default(),
                    "Job still solving"
                );
                on_tick(started.elapsed());
                continue;
            }

            tracing::debug!(
                job = %job,
                ticks,
                elapsed_secs = started.elapsed().as_secs_f64(),
                "Job finished"
            );
            return Ok(Some(plan));
        }
    }

    /// Best-effort visualization fetch
    pub async fn fetch_enrichment(&self, job: &JobId) -> Option<serde_json::Value> {
        match self.client.enrichment(job).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    job = %job,
                    error = %e,
                    "Visualization unavailable, falling back to straight-line routes"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for ResultPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultPoller")
            .field("client", &self.client.name())
            .field("interval", &self.interval)
            .finish()
    }
}
