//! Client for the Timefold vehicle-routing REST service
//!
//! Endpoint layout:
//!
//! | Operation | Request |
//! |---|---|
//! | demo data | `GET /demo-data/{dataset}` |
//! | benchmark submit | `POST /route-plans-fresh` |
//! | status | `GET /route-plans/{job}` |
//! | visualization | `GET /route-visualization/{job}` |
//! | start | `POST /route-plans` |
//! | terminate | `DELETE /route-plans/{job}` |

use async_trait::async_trait;
use reqwest::Client;
use vrp_bench_core::{
    ClientError, DemoDataset, JobId, ProblemSource, RoutePlan, SolveClient, SolveOutcome,
};

use crate::http::{ensure_success, parse_base_url, read_json, ConfigValidationError, HttpConfig};

/// Timefold REST client
///
/// Implements both [`SolveClient`] and [`ProblemSource`], since the demo
/// data is served by the same backend.
#[derive(Debug, Clone)]
pub struct TimefoldClient {
    client: Client,
    base_url: String,
}

/// Error building a [`TimefoldClient`]
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigValidationError),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

impl TimefoldClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str, config: &HttpConfig) -> Result<Self, ClientBuildError> {
        config.validate()?;
        let base_url = parse_base_url(base_url)?;
        let client = config.build_client()?;
        tracing::debug!(base_url = %base_url, timeout = ?config.request_timeout, "Created solver client");
        Ok(Self { client, base_url })
    }

    /// Normalised base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET` URL of a demo dataset
    pub fn demo_data_url(&self, dataset: DemoDataset) -> String {
        format!("{}/demo-data/{}", self.base_url, dataset.id())
    }

    /// `POST` URL of a fresh benchmark solve
    pub fn submit_url(&self) -> String {
        format!("{}/route-plans-fresh", self.base_url)
    }

    /// `POST` URL of a long-running solve
    pub fn start_url(&self) -> String {
        format!("{}/route-plans", self.base_url)
    }

    /// `GET`/`DELETE` URL of a job
    pub fn job_url(&self, job: &JobId) -> String {
        format!("{}/route-plans/{}", self.base_url, job)
    }

    /// `GET` URL of a job's road-network visualization
    pub fn visualization_url(&self, job: &JobId) -> String {
        format!("{}/route-visualization/{}", self.base_url, job)
    }
}

#[async_trait]
impl SolveClient for TimefoldClient {
    fn name(&self) -> &str {
        "timefold"
    }

    async fn submit(&self, problem: &RoutePlan) -> Result<SolveOutcome, ClientError> {
        let response = self.client.post(self.submit_url()).json(problem).send().await?;
        let body: serde_json::Value = read_json(response).await?;
        let outcome = SolveOutcome::classify(body)?;
        tracing::debug!(
            direct = matches!(outcome, SolveOutcome::Direct(_)),
            "Classified submit response"
        );
        Ok(outcome)
    }

    async fn status(&self, job: &JobId) -> Result<RoutePlan, ClientError> {
        let response = self.client.get(self.job_url(job)).send().await?;
        read_json(response).await
    }

    async fn enrichment(&self, job: &JobId) -> Result<serde_json::Value, ClientError> {
        let response = self.client.get(self.visualization_url(job)).send().await?;
        read_json(response).await
    }

    async fn start(&self, problem: &RoutePlan) -> Result<JobId, ClientError> {
        let response = self.client.post(self.start_url()).json(problem).send().await?;
        let body = ensure_success(response).await?.text().await?;
        JobId::from_plain_text(&body).ok_or_else(|| {
            ClientError::UnexpectedResponseShape(format!("expected a job id, got {:?}", body))
        })
    }

    async fn cancel(&self, job: &JobId) -> Result<(), ClientError> {
        let response = self.client.delete(self.job_url(job)).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl ProblemSource for TimefoldClient {
    async fn load(&self, dataset: DemoDataset) -> Result<RoutePlan, ClientError> {
        tracing::debug!(dataset = %dataset, "Loading demo data");
        let response = self.client.get(self.demo_data_url(dataset)).send().await?;
        read_json(response).await
    }
}
