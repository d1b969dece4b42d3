//! Orchestrator execution logic

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::archive::ArchiveEntry;
use crate::config::{BenchmarkConfig, MetricPolicy, Pacing};
use crate::error::{BenchError, BenchResult};
use crate::metrics::{IterationResult, Resolution};
use crate::poller::{PollOutcome, ResultPoller};
use crate::signal::{RunFlag, StopSignal};
use crate::solution::{RoutePlan, SolveOutcome};
use crate::traits::{Presenter, PresenterError, ProblemSource, SolveClient};

use super::aggregator::RunningStatistics;
use super::state::{BenchmarkRunState, RunPhase};

/// A resolved iteration before it is archived
struct Resolved {
    solution: RoutePlan,
    enrichment: Option<serde_json::Value>,
    resolution: Resolution,
}

/// Drives chained solve iterations against a routing solver
///
/// Only one run can be active at a time. State is owned here and handed out
/// as cloned snapshots.
pub struct BenchmarkOrchestrator {
    /// Solver client
    pub(crate) client: Arc<dyn SolveClient>,

    /// Source of the initial problem instance
    pub(crate) source: Arc<dyn ProblemSource>,

    /// Progress receiver
    pub(crate) presenter: Arc<dyn Presenter>,

    /// Poll cadence and inter-iteration pause
    pub(crate) pacing: Pacing,

    /// Raw metric conversion
    pub(crate) metric_policy: MetricPolicy,

    /// Current or last run
    pub(crate) state: Arc<RwLock<BenchmarkRunState>>,

    /// Run flag; cleared by `stop()`, released when `run()` returns
    pub(crate) flag: RunFlag,
}

impl BenchmarkOrchestrator {
    /// Create a new orchestrator
    ///
    /// Use `OrchestratorBuilder` for a more ergonomic construction.
    pub fn new(
        client: Arc<dyn SolveClient>,
        source: Arc<dyn ProblemSource>,
        presenter: Arc<dyn Presenter>,
        pacing: Pacing,
        metric_policy: MetricPolicy,
    ) -> Self {
        Self {
            client,
            source,
            presenter,
            pacing,
            metric_policy,
            state: Arc::new(RwLock::new(BenchmarkRunState::default())),
            flag: RunFlag::new(),
        }
    }

    /// Whether a run is active and has not been asked to stop
    pub fn is_running(&self) -> bool {
        self.flag.is_running()
    }

    /// Whether a run is still in flight, including one winding down after `stop()`
    pub fn is_active(&self) -> bool {
        self.flag.is_active()
    }

    /// Ask the active run to stop
    ///
    /// Observed before the next iteration, at the next poll tick or during
    /// the inter-iteration pause. In-flight requests are not aborted. Calling
    /// this when nothing runs, or more than once, has no further effect.
    pub fn stop(&self) -> bool {
        let changed = self.flag.stop();
        if changed {
            tracing::info!("Stop requested");
        }
        changed
    }

    /// Copy of the current run state
    pub async fn snapshot(&self) -> BenchmarkRunState {
        let mut snapshot = self.state.read().await.clone();
        snapshot.running = self.flag.is_running();
        snapshot
    }

    /// Show an archived iteration again
    ///
    /// Returns the entry for the 1-based `index`, if archived.
    pub async fn replay(&self, index: usize) -> Option<ArchiveEntry> {
        let entry = self.state.read().await.archive.iteration(index).cloned()?;
        self.notify("replay", |p| p.on_replay(&entry));
        Some(entry)
    }

    /// Run a benchmark to completion
    ///
    /// Returns the final snapshot for completed and stopped runs. Setup,
    /// dispatch and polling failures end the run in the `Failed` phase with
    /// the archive preserved, and are returned as errors.
    pub async fn run(&self, config: BenchmarkConfig) -> BenchResult<BenchmarkRunState> {
        config
            .validate()
            .map_err(|e| BenchError::config(e.to_string()))?;

        let Some(guard) = self.flag.try_begin() else {
            tracing::warn!("Benchmark already running, start ignored");
            return Err(BenchError::AlreadyRunning);
        };

        *self.state.write().await = BenchmarkRunState::starting(config);

        tracing::info!(
            client = self.client.name(),
            iterations = config.iteration_count,
            dataset = %config.dataset,
            "Starting benchmark"
        );

        let result = self.execute(config, guard.signal()).await;
        drop(guard);
        result
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Ctrl+C stops the run; iterations archived so far are kept.
    pub async fn run_with_signal_handling(
        self: &Arc<Self>,
        config: BenchmarkConfig,
    ) -> BenchResult<BenchmarkRunState> {
        let orchestrator = Arc::clone(self);

        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, stopping benchmark...");
                    orchestrator.stop();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
            }
        });

        let result = self.run(config).await;
        signal_handle.abort();
        result
    }

    async fn execute(
        &self,
        config: BenchmarkConfig,
        mut signal: StopSignal,
    ) -> BenchResult<BenchmarkRunState> {
        let total = config.iteration_count;
        self.notify_progress(
            0,
            total,
            &format!("Loading demo data {}...", config.dataset),
        );

        let mut problem = match self.source.load(config.dataset).await {
            Ok(problem) => problem,
            Err(e) => {
                return Err(self
                    .fail(BenchError::setup(format!(
                        "failed to load demo data {}: {}",
                        config.dataset,
                        e.diagnostic()
                    )))
                    .await)
            }
        };

        tracing::debug!(
            vehicles = problem.vehicle_count(),
            visits = problem.visit_count(),
            "Loaded demo data"
        );

        let mut stopped = false;

        for index in 1..=total {
            if signal.is_stopped() {
                stopped = true;
                break;
            }

            self.state.write().await.current_iteration = index;
            self.notify_progress(
                index,
                total,
                &format!("Running iteration {}/{}...", index, total),
            );

            let started = Instant::now();
            let resolved = match self.resolve(index, total, &problem, &mut signal).await {
                Ok(Some(resolved)) => resolved,
                Ok(None) => {
                    stopped = true;
                    break;
                }
                Err(e) => return Err(self.fail(e).await),
            };

            let result = IterationResult::from_solution(
                index,
                &resolved.solution,
                started.elapsed(),
                resolved.resolution,
                resolved.enrichment.is_some(),
                &self.metric_policy,
            );
            let statistics = self.archive(&result, &resolved).await;

            tracing::info!(
                iteration = index,
                metric = result.primary_metric,
                raw = result.raw_metric,
                elapsed_secs = result.elapsed_seconds,
                resolution = ?result.resolution,
                "Iteration complete"
            );

            if let Some(statistics) = &statistics {
                self.notify("iteration_complete", |p| {
                    p.on_iteration_complete(&result, &resolved.solution, statistics)
                });
            }
            self.notify_progress(
                index,
                total,
                &format!(
                    "Iteration {}/{} complete: {:.1} km",
                    index, total, result.primary_metric
                ),
            );

            // The next iteration starts from this solution.
            problem = resolved.solution;

            if index < total && signal.sleep(self.pacing.iteration_pause).await {
                stopped = true;
                break;
            }
        }

        // A stop during the last dispatch still keeps its result.
        stopped |= signal.is_stopped();
        Ok(self.finish(total, stopped).await)
    }

    /// Dispatch one iteration and wait for its solution
    ///
    /// `Ok(None)` means the run was stopped while polling.
    async fn resolve(
        &self,
        index: usize,
        total: usize,
        problem: &RoutePlan,
        signal: &mut StopSignal,
    ) -> BenchResult<Option<Resolved>> {
        let outcome = self
            .client
            .submit(problem)
            .await
            .map_err(|e| BenchError::dispatch(index, e.diagnostic()))?;

        match outcome {
            SolveOutcome::Direct(solution) => Ok(Some(Resolved {
                solution,
                enrichment: None,
                resolution: Resolution::Direct,
            })),
            SolveOutcome::Handle(job) => {
                tracing::debug!(iteration = index, job = %job, "Polling job");
                let poller = ResultPoller::new(Arc::clone(&self.client), self.pacing.poll_interval);
                let outcome = poller
                    .poll(&job, signal, |elapsed| {
                        self.notify_progress(
                            index,
                            total,
                            &format!(
                                "Iteration {}/{}: solver still running ({}s)",
                                index,
                                total,
                                elapsed.as_secs()
                            ),
                        )
                    })
                    .await
                    .map_err(|e| BenchError::poll(index, e.diagnostic()))?;

                Ok(match outcome {
                    PollOutcome::Finished {
                        solution,
                        enrichment,
                    } => Some(Resolved {
                        solution,
                        enrichment,
                        resolution: Resolution::Polled,
                    }),
                    PollOutcome::Cancelled => None,
                })
            }
        }
    }

    /// Append to the archive and recompute statistics under one lock
    async fn archive(
        &self,
        result: &IterationResult,
        resolved: &Resolved,
    ) -> Option<RunningStatistics> {
        let mut state = self.state.write().await;
        state.archive.append(ArchiveEntry {
            result: result.clone(),
            solution: resolved.solution.clone(),
            enrichment: resolved.enrichment.clone(),
        });
        state.statistics = RunningStatistics::from_archive(&state.archive);
        state.statistics
    }

    async fn finish(&self, total: usize, stopped: bool) -> BenchmarkRunState {
        let snapshot = {
            let mut state = self.state.write().await;
            state.phase = if stopped {
                RunPhase::Stopped
            } else {
                RunPhase::Completed
            };
            state.running = false;
            state.finished_at = Some(Utc::now());
            state.clone()
        };

        let completed = snapshot.archive.len();
        if stopped {
            tracing::info!(completed, total, "Benchmark stopped");
            self.notify_progress(
                snapshot.current_iteration,
                total,
                &format!(
                    "Benchmark stopped after {} of {} iterations",
                    completed, total
                ),
            );
        } else if let Some(statistics) = &snapshot.statistics {
            let tier = statistics.tier();
            tracing::info!(
                iterations = completed,
                best = statistics.best,
                worst = statistics.worst,
                mean = statistics.mean,
                std_dev = statistics.std_dev,
                std_dev_percent = statistics.std_dev_percent,
                tier = %tier,
                "Benchmark completed"
            );
            self.notify("run_complete", |p| p.on_run_complete(statistics, tier));
        }

        snapshot
    }

    /// Record a failure; the archive is left untouched
    async fn fail(&self, error: BenchError) -> BenchError {
        let reason = error.to_string();
        {
            let mut state = self.state.write().await;
            state.phase = RunPhase::Failed;
            state.running = false;
            state.finished_at = Some(Utc::now());
            state.failure = Some(reason.clone());
        }
        tracing::error!(error = %error, "Benchmark failed");
        self.notify("run_failed", |p| p.on_run_failed(&reason));
        error
    }

    fn notify_progress(&self, iteration: usize, total: usize, message: &str) {
        self.notify("progress", |p| p.on_progress(iteration, total, message));
    }

    /// Deliver a notification, containing presenter errors and panics
    fn notify<F>(&self, event: &'static str, deliver: F)
    where
        F: FnOnce(&dyn Presenter) -> Result<(), PresenterError>,
    {
        let presenter = self.presenter.as_ref();
        match std::panic::catch_unwind(AssertUnwindSafe(|| deliver(presenter))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(event, error = %e, "Presenter notification failed");
            }
            Err(_) => {
                tracing::warn!(event, "Presenter panicked during notification");
            }
        }
    }
}

impl std::fmt::Debug for BenchmarkOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkOrchestrator")
            .field("client", &self.client.name())
            .field("pacing", &self.pacing)
            .field("metric_policy", &self.metric_policy)
            .field("running", &self.flag.is_running())
            .finish()
    }
}
