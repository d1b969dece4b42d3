//! CSV export of archived iterations

use std::path::Path;

use csv::Writer;
use vrp_bench_core::{deltas, ResultArchive, Resolution};

use crate::error::{ReportError, ReportResult};

/// Writes one row per archived iteration
pub struct CsvExporter;

impl CsvExporter {
    /// Column headers
    pub const HEADERS: [&'static str; 13] = [
        "iteration",
        "distance_km",
        "driving_time_seconds",
        "vs_previous_percent",
        "vs_best_percent",
        "trend",
        "elapsed_seconds",
        "score",
        "vehicles",
        "visits",
        "resolution",
        "road_network",
        "completed_at",
    ];

    /// Export the archive to `path`
    pub fn export(archive: &ResultArchive, path: &Path) -> ReportResult<()> {
        let mut wtr = Writer::from_path(path)?;

        wtr.write_record(Self::HEADERS)?;

        for (result, delta) in archive.results().zip(deltas(&archive.metrics())) {
            wtr.write_record(&[
                result.index.to_string(),
                result.primary_metric.to_string(),
                result.raw_metric.to_string(),
                delta
                    .vs_previous
                    .map(|v| format!("{:.2}", v))
                    .unwrap_or_default(),
                format!("{:.2}", delta.vs_best),
                delta.trend.marker().to_string(),
                format!("{:.3}", result.elapsed_seconds),
                result.score_label.clone().unwrap_or_default(),
                result.resource_count.to_string(),
                result.demand_point_count.to_string(),
                match result.resolution {
                    Resolution::Direct => "direct".to_string(),
                    Resolution::Polled => "polled".to_string(),
                },
                result.enrichment_available.to_string(),
                result.completed_at.to_rfc3339(),
            ])?;
        }

        wtr.flush().map_err(|e| ReportError::io(path, e))?;
        tracing::debug!(path = %path.display(), rows = archive.len(), "Wrote CSV export");
        Ok(())
    }
}
