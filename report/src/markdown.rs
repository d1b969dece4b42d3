//! Markdown summary of a benchmark run

use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::console::{format_driving_time, format_percent, vehicle_breakdown};
use crate::document::ArchiveDocument;
use crate::error::{ReportError, ReportResult};

/// Render a run as markdown
pub fn generate_summary(document: &ArchiveDocument) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Routing Benchmark Summary");
    let _ = writeln!(output);
    let _ = writeln!(output, "Generated: {}", document.generated_at.to_rfc3339());
    if let Some(config) = &document.config {
        let _ = writeln!(output, "Dataset: {}", config.dataset);
        let _ = writeln!(output, "Planned iterations: {}", config.iteration_count);
    }
    let _ = writeln!(output, "Outcome: {}", document.phase);
    if let Some(failure) = &document.failure {
        let _ = writeln!(output, "Failure: {}", failure);
    }
    if let Some(seconds) = document.total_run_seconds() {
        let _ = writeln!(output, "Total run time: {:.1}s", seconds);
    }
    let _ = writeln!(output);

    if let (Some(stats), Some(tier)) = (&document.statistics, document.tier) {
        let _ = writeln!(output, "## Consistency");
        let _ = writeln!(output);
        let _ = writeln!(output, "**{}**", tier.label());
        let _ = writeln!(output);
        let _ = writeln!(output, "{}", tier.assessment());
        let _ = writeln!(output);
        let _ = writeln!(output, "| Best | Average | Worst | Std dev | Variance |");
        let _ = writeln!(output, "|------|---------|-------|---------|----------|");
        let _ = writeln!(
            output,
            "| {:.1} km | {:.1} km | {:.1} km | {:.2} km | {:.1}% |",
            stats.best, stats.mean, stats.worst, stats.std_dev, stats.std_dev_percent
        );
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "## Iterations");
    let _ = writeln!(output);
    if document.archive.is_empty() {
        let _ = writeln!(output, "No iterations archived.");
        return output;
    }

    let _ = writeln!(
        output,
        "| # | Distance | Driving time | Solve | Vehicles | Visits | vs Previous | vs Best | Trend |"
    );
    let _ = writeln!(
        output,
        "|---|----------|--------------|-------|----------|--------|-------------|---------|-------|"
    );
    for (result, delta) in document.archive.results().zip(document.deltas()) {
        let _ = writeln!(
            output,
            "| {} | {:.1} km | {} | {:.1}s | {} | {} | {} | {} | {} |",
            result.index,
            result.primary_metric,
            format_driving_time(result.raw_metric),
            result.elapsed_seconds,
            result.resource_count,
            result.demand_point_count,
            delta
                .vs_previous
                .map(format_percent)
                .unwrap_or_else(|| "First".to_string()),
            format_percent(delta.vs_best),
            delta.trend.marker(),
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Vehicles");
    let _ = writeln!(output);
    for result in document.archive.results() {
        if result.unit_details.is_empty() {
            continue;
        }
        let _ = writeln!(
            output,
            "- Iteration {}: {}",
            result.index,
            vehicle_breakdown(&result.unit_details)
        );
    }

    output
}

/// Write the markdown summary to `path`
pub fn write_markdown(document: &ArchiveDocument, path: &Path) -> ReportResult<()> {
    fs::write(path, generate_summary(document)).map_err(|e| ReportError::io(path, e))?;
    tracing::debug!(path = %path.display(), "Wrote markdown summary");
    Ok(())
}
