//! Plain-text rendering for terminals

use std::fmt::Write;

use vrp_bench_core::{
    deltas, ArchiveEntry, ConsistencyTier, IterationDelta, ResultArchive, RoutePlan,
    RunningStatistics, SolveTimings, VehicleDetail,
};

const RULE_WIDTH: usize = 70;

/// Horizontal rule
pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Format a driving time as `{h}h {m}m`, minutes rounded
pub fn format_driving_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0).floor();
    let minutes = ((seconds % 3600.0) / 60.0).round();
    format!("{}h {}m", hours as u64, minutes as u64)
}

/// Signed percentage with one decimal, e.g. `+10.0%`
pub fn format_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{:.1}%", value)
    } else {
        format!("{:.1}%", value)
    }
}

fn format_vs_previous(delta: &IterationDelta) -> String {
    match delta.vs_previous {
        Some(value) => format_percent(value),
        None => "First".to_string(),
    }
}

/// `Vehicle <id>: <h>h <m>m (<n> visits, <demand>/<capacity> capacity)`
pub fn format_vehicle(vehicle: &VehicleDetail) -> String {
    format!(
        "Vehicle {}: {} ({} visits, {}/{} capacity)",
        vehicle.id,
        format_driving_time(vehicle.driving_time_seconds),
        vehicle.visit_count,
        vehicle.total_demand,
        vehicle.capacity
    )
}

/// Per-vehicle breakdown on one line
pub fn vehicle_breakdown(vehicles: &[VehicleDetail]) -> String {
    vehicles
        .iter()
        .map(format_vehicle)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Results table with deltas, trend marker and vehicle breakdown
pub fn results_table(archive: &ResultArchive) -> String {
    let mut out = String::new();
    if archive.is_empty() {
        out.push_str("No iterations archived.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>4}  {:<5} {:>10} {:>9} {:>8} {:>8} {:>6} {:>9} {:>8}  {}",
        "Iter", "Trend", "Distance", "Driving", "Solve", "Vehicles", "Visits", "vs Prev", "vs Best",
        "Routes"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH + 24));

    for (result, delta) in archive.results().zip(deltas(&archive.metrics())) {
        let _ = writeln!(
            out,
            "{:>4}  {:<5} {:>10} {:>9} {:>8} {:>8} {:>6} {:>9} {:>8}  {}",
            result.index,
            delta.trend.marker(),
            format!("{:.1}km", result.primary_metric),
            format_driving_time(result.raw_metric),
            format!("{:.1}s", result.elapsed_seconds),
            result.resource_count,
            result.demand_point_count,
            format_vs_previous(&delta),
            format_percent(delta.vs_best),
            route_type(result.enrichment_available),
        );
        if !result.unit_details.is_empty() {
            let _ = writeln!(out, "      {}", vehicle_breakdown(&result.unit_details));
        }
    }
    out
}

fn route_type(enrichment_available: bool) -> &'static str {
    if enrichment_available {
        "road network"
    } else {
        "straight lines"
    }
}

/// Headline statistics of a run
pub fn statistics_block(
    statistics: &RunningStatistics,
    tier: ConsistencyTier,
    total_run_seconds: Option<f64>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Iterations:      {}", statistics.count);
    let _ = writeln!(out, "Best:            {:.1}km", statistics.best);
    let _ = writeln!(out, "Average:         {:.1}km", statistics.mean);
    let _ = writeln!(out, "Worst:           {:.1}km", statistics.worst);
    let _ = writeln!(out, "Std deviation:   {:.2}km", statistics.std_dev);
    let _ = writeln!(out, "Variance:        {:.1}%", statistics.std_dev_percent);
    if let Some(seconds) = total_run_seconds {
        let _ = writeln!(out, "Total time:      {:.1}s", seconds);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", tier.label());
    let _ = writeln!(out, "{}", tier.assessment());
    out
}

/// Detail view of one archived iteration
pub fn iteration_details(entry: &ArchiveEntry) -> String {
    let result = &entry.result;
    let mut out = String::new();
    let _ = writeln!(out, "Iteration {}", result.index);
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "Total distance:     {:.1}km", result.primary_metric);
    let _ = writeln!(
        out,
        "Total driving time: {}",
        format_driving_time(result.raw_metric)
    );
    let _ = writeln!(out, "Solve duration:     {:.1}s", result.elapsed_seconds);
    let _ = writeln!(
        out,
        "Score:              {}",
        result.score_label.as_deref().unwrap_or("n/a")
    );
    let _ = writeln!(out, "Vehicles used:      {}", result.resource_count);
    let _ = writeln!(out, "Visits planned:     {}", result.demand_point_count);
    let _ = writeln!(
        out,
        "Route type:         {}",
        route_type(result.enrichment_available)
    );
    let _ = writeln!(
        out,
        "Completed at:       {}",
        result.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if !result.unit_details.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<10} {:>12} {:>7} {:>9}",
            "Vehicle", "Driving", "Visits", "Load"
        );
        for vehicle in &result.unit_details {
            let _ = writeln!(
                out,
                "{:<10} {:>12} {:>7} {:>9}",
                vehicle.id,
                format_driving_time(vehicle.driving_time_seconds),
                vehicle.visit_count,
                format!("{}/{}", vehicle.total_demand, vehicle.capacity)
            );
        }
    }
    out
}

/// Summary of a single solve
pub fn solve_summary(
    solution: &RoutePlan,
    road_network: bool,
    timings: &SolveTimings,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Score:              {}",
        solution.score.as_deref().unwrap_or("n/a")
    );
    let _ = writeln!(
        out,
        "Total driving time: {}",
        format_driving_time(solution.driving_time_seconds())
    );
    let _ = writeln!(out, "Vehicles:           {}", solution.vehicle_count());
    let _ = writeln!(out, "Visits:             {}", solution.visit_count());
    let _ = writeln!(out, "Route type:         {}", route_type(road_network));
    let _ = writeln!(
        out,
        "Timing:             {:.1}s (optimisation {:.1}s, visualization {:.1}s)",
        timings.total().as_secs_f64(),
        timings.optimisation.as_secs_f64(),
        timings.visualization.as_secs_f64()
    );
    out
}
