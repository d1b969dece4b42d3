//! HTTP client configuration and response helpers

use std::time::Duration;

use reqwest::{Client, Response, Url};
use thiserror::Error;
use vrp_bench_core::ClientError;

/// Rejected HTTP settings
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// The base URL is not an absolute http(s) URL
    #[error("invalid base URL {0:?}: {1}")]
    InvalidBaseUrl(String, String),

    /// A timeout lies outside its allowed window
    #[error("{name} timeout {value:?} outside {min:?}..={max:?}")]
    InvalidTimeout {
        /// Which timeout
        name: &'static str,
        /// Configured value
        value: Duration,
        /// Smallest accepted value
        min: Duration,
        /// Largest accepted value
        max: Duration,
    },
}

/// Accepted window for the per-request timeout
const REQUEST_TIMEOUT_WINDOW: (Duration, Duration) =
    (Duration::from_secs(1), Duration::from_secs(3600));

/// Accepted window for the connect timeout
const CONNECT_TIMEOUT_WINDOW: (Duration, Duration) =
    (Duration::from_secs(1), Duration::from_secs(300));

/// Settings of the reqwest client talking to the solver
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout, covering synchronous solves
    pub request_timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Idle keep-alive connections are dropped after this long
    pub idle_timeout: Duration,

    /// Sent as `User-Agent`
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(60),
            user_agent: format!("vrp-bench/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn check_window(
    name: &'static str,
    value: Duration,
    (min, max): (Duration, Duration),
) -> Result<(), ConfigValidationError> {
    if value < min || value > max {
        return Err(ConfigValidationError::InvalidTimeout {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl HttpConfig {
    /// Replace the whole-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check both timeouts against their windows
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        check_window("request", self.request_timeout, REQUEST_TIMEOUT_WINDOW)?;
        check_window("connect", self.connect_timeout, CONNECT_TIMEOUT_WINDOW)
    }

    /// Build the reqwest client, keeping at most one idle connection
    pub fn build_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.idle_timeout)
            .pool_max_idle_per_host(1)
            .user_agent(&self.user_agent)
            .build()
    }
}

/// Parse and normalise a solver base URL.
///
/// Trailing slashes are removed so endpoint paths can be appended directly.
pub fn parse_base_url(raw: &str) -> Result<String, ConfigValidationError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| ConfigValidationError::InvalidBaseUrl(raw.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigValidationError::InvalidBaseUrl(
            raw.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Best available diagnostic for a failed response.
///
/// Prefers the JSON `detail` field, then the raw body text, then
/// `HTTP <status>`.
pub fn diagnostic_from_body(status: u16, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(body) {
        match map.get("detail") {
            Some(serde_json::Value::String(detail)) if !detail.trim().is_empty() => {
                return detail.clone();
            }
            Some(serde_json::Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }

    let text = body.trim();
    if text.is_empty() {
        format!("HTTP {}", status)
    } else {
        text.to_string()
    }
}

/// Turn a non-success response into [`ClientError::Status`].
pub async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = diagnostic_from_body(status.as_u16(), &body);
    tracing::debug!(status = status.as_u16(), message = %message, "Request failed");
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Read a successful response body as JSON of type `T`.
pub async fn read_json<T>(response: Response) -> Result<T, ClientError>
where
    T: serde::de::DeserializeOwned,
{
    let body = ensure_success(response).await?.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Payload(e.to_string()))
}
