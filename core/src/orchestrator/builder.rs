//! Builder pattern for BenchmarkOrchestrator construction

use std::sync::Arc;
use std::time::Duration;

use crate::config::{MetricPolicy, Pacing};
use crate::error::{BenchError, BenchResult};
use crate::traits::{NoopPresenter, Presenter, ProblemSource, SolveClient};

use super::executor::BenchmarkOrchestrator;

/// Builder for creating a BenchmarkOrchestrator
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .client(client.clone())
///     .source(client)
///     .presenter(Arc::new(ConsolePresenter::new(5)))
///     .build()?;
///
/// let state = orchestrator.run(BenchmarkConfig::new(5, DemoDataset::SingaporeWide)).await?;
/// ```
pub struct OrchestratorBuilder {
    client: Option<Arc<dyn SolveClient>>,
    source: Option<Arc<dyn ProblemSource>>,
    presenter: Arc<dyn Presenter>,
    pacing: Pacing,
    metric_policy: MetricPolicy,
}

impl OrchestratorBuilder {
    /// Create a new builder with default pacing and metric policy
    pub fn new() -> Self {
        Self {
            client: None,
            source: None,
            presenter: Arc::new(NoopPresenter),
            pacing: Pacing::default(),
            metric_policy: MetricPolicy::default(),
        }
    }

    /// Set the solver client
    pub fn client(mut self, client: Arc<dyn SolveClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the problem source
    pub fn source(mut self, source: Arc<dyn ProblemSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the presenter
    pub fn presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    /// Set poll interval and inter-iteration pause together
    pub fn pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Set the status poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.pacing.poll_interval = interval;
        self
    }

    /// Set the pause between iterations
    pub fn iteration_pause(mut self, pause: Duration) -> Self {
        self.pacing.iteration_pause = pause;
        self
    }

    /// Set the raw metric conversion
    pub fn metric_policy(mut self, policy: MetricPolicy) -> Self {
        self.metric_policy = policy;
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if the client or source is not set, the poll interval
    /// is zero, or the metric scale is not a positive finite number.
    pub fn build(self) -> BenchResult<BenchmarkOrchestrator> {
        let client = self
            .client
            .ok_or_else(|| BenchError::missing_config("client"))?;

        let source = self
            .source
            .ok_or_else(|| BenchError::missing_config("source"))?;

        if self.pacing.poll_interval.is_zero() {
            return Err(BenchError::config("poll interval must be greater than zero"));
        }

        if !(self.metric_policy.scale.is_finite() && self.metric_policy.scale > 0.0) {
            return Err(BenchError::config(format!(
                "metric scale must be positive, got {}",
                self.metric_policy.scale
            )));
        }

        Ok(BenchmarkOrchestrator::new(
            client,
            source,
            self.presenter,
            self.pacing,
            self.metric_policy,
        ))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
