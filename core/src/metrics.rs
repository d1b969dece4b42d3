//! Per-iteration result records

use crate::config::MetricPolicy;
use crate::solution::{RoutePlan, Vehicle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How an iteration's solution was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Returned in the submit response
    Direct,
    /// Discovered by polling a job handle
    Polled,
}

/// Per-vehicle breakdown of a solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleDetail {
    /// Vehicle identifier
    pub id: String,
    /// Driving time of the vehicle's route
    pub driving_time_seconds: f64,
    /// Demand served
    pub total_demand: i64,
    /// Vehicle capacity
    pub capacity: i64,
    /// Number of visits on the route
    pub visit_count: usize,
}

impl From<&Vehicle> for VehicleDetail {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id.clone(),
            driving_time_seconds: vehicle.total_driving_time_seconds.unwrap_or(0.0),
            total_demand: vehicle.total_demand.unwrap_or(0),
            capacity: vehicle.capacity.unwrap_or(0),
            visit_count: vehicle.visits.len(),
        }
    }
}

/// Outcome of one completed iteration
///
/// Created once when the iteration resolves and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationResult {
    /// 1-based iteration index
    pub index: usize,
    /// Compared metric (approximate distance, km)
    pub primary_metric: f64,
    /// Solver-reported total driving time, seconds
    pub raw_metric: f64,
    /// Wall time from dispatch to resolution
    pub elapsed_seconds: f64,
    /// Solver score string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_label: Option<String>,
    /// When the iteration resolved
    pub completed_at: DateTime<Utc>,
    /// Per-vehicle breakdown
    pub unit_details: Vec<VehicleDetail>,
    /// Number of vehicles
    pub resource_count: usize,
    /// Number of visits
    pub demand_point_count: usize,
    /// Direct or polled
    pub resolution: Resolution,
    /// Whether a road-network visualization payload was retrieved
    pub enrichment_available: bool,
}

impl IterationResult {
    /// Build the record for a resolved solution
    pub fn from_solution(
        index: usize,
        solution: &RoutePlan,
        elapsed: Duration,
        resolution: Resolution,
        enrichment_available: bool,
        policy: &MetricPolicy,
    ) -> Self {
        let raw_metric = solution.driving_time_seconds();
        Self {
            index,
            primary_metric: policy.primary_metric(raw_metric),
            raw_metric,
            elapsed_seconds: elapsed.as_secs_f64(),
            score_label: solution.score.clone(),
            completed_at: Utc::now(),
            unit_details: solution.vehicles.iter().map(VehicleDetail::from).collect(),
            resource_count: solution.vehicle_count(),
            demand_point_count: solution.visit_count(),
            resolution,
            enrichment_available,
        }
    }

    /// Completion time as Unix epoch milliseconds
    pub fn completed_at_epoch_millis(&self) -> i64 {
        self.completed_at.timestamp_millis()
    }
}
