//! Solver payloads and response classification
//!
//! A [`RoutePlan`] is both the problem instance sent to the solver and the
//! solution it returns. Only the fields the benchmark reads are typed; every
//! other field is carried through untouched so a solution can be resubmitted
//! as the next problem instance.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::traits::ClientError;

/// Solver status reported while no solve is in progress
pub const IDLE_SOLVER_STATUS: &str = "NOT_SOLVING";

/// Keys under which the backend may return an asynchronous job identifier
const JOB_ID_KEYS: &[&str] = &["schedule_id", "jobId", "job_id"];

/// Opaque identifier of a remote solve job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Create a new job ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse the plain-text body returned when a solve is started
    ///
    /// Returns `None` for an empty body.
    pub fn from_plain_text(body: &str) -> Option<Self> {
        let id = body.trim().trim_matches('"').trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    /// Get the ID as a string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vehicle in a route plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Vehicle identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Driving time of this vehicle's route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_driving_time_seconds: Option<f64>,

    /// Demand served by this vehicle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_demand: Option<i64>,

    /// Vehicle capacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,

    /// Visits assigned to this vehicle, in route order
    #[serde(default)]
    pub visits: Vec<Value>,

    /// Fields not interpreted by the benchmark
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Problem instance or solution exchanged with the solver
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    /// Solver score, e.g. `0hard/-12345soft`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,

    /// Solver lifecycle status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_status: Option<String>,

    /// Total driving time across all vehicles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_driving_time_seconds: Option<f64>,

    /// Vehicles and their routes
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,

    /// Visits (demand points)
    #[serde(default)]
    pub visits: Vec<Value>,

    /// Fields not interpreted by the benchmark
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoutePlan {
    /// Whether the solver is still working on this plan
    ///
    /// A missing status, or the idle sentinel, means the job is terminal.
    pub fn is_solving(&self) -> bool {
        matches!(self.solver_status.as_deref(), Some(status) if status != IDLE_SOLVER_STATUS)
    }

    /// Total driving time, zero when not reported
    pub fn driving_time_seconds(&self) -> f64 {
        self.total_driving_time_seconds.unwrap_or(0.0)
    }

    /// Number of vehicles
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Number of visits
    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }
}

/// Shape of a solve submission response
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// The service solved synchronously and returned the solution
    Direct(RoutePlan),
    /// The service accepted the job; completion must be polled
    Handle(JobId),
}

impl SolveOutcome {
    /// Classify a decoded submission response body
    ///
    /// A non-null `solution` wins over a job identifier. Anything else is
    /// [`ClientError::UnexpectedResponseShape`].
    pub fn classify(body: Value) -> Result<Self, ClientError> {
        let Value::Object(mut map) = body else {
            return Err(ClientError::UnexpectedResponseShape(format!(
                "expected a JSON object, got {}",
                json_kind(&body)
            )));
        };

        if let Some(solution) = map.remove("solution").filter(|v| !v.is_null()) {
            let plan = serde_json::from_value(solution)
                .map_err(|e| ClientError::Payload(format!("invalid solution payload: {}", e)))?;
            return Ok(SolveOutcome::Direct(plan));
        }

        for key in JOB_ID_KEYS {
            match map.remove(*key) {
                Some(Value::String(id)) if !id.trim().is_empty() => {
                    return Ok(SolveOutcome::Handle(JobId::new(id.trim())));
                }
                Some(Value::Number(n)) => return Ok(SolveOutcome::Handle(JobId::new(n.to_string()))),
                _ => {}
            }
        }

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        Err(ClientError::UnexpectedResponseShape(format!(
            "neither a solution nor a job id in response (keys: {:?})",
            keys
        )))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            json_kind(&other)
        ))),
    }
}
