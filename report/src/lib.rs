//! Result export and rendering for benchmark runs
//!
//! This crate turns a finished (or interrupted) run into:
//!
//! - A JSON archive document that can be reloaded and re-rendered
//! - A per-iteration CSV export
//! - A markdown summary
//! - Plain-text tables and detail views for the terminal

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod console;
pub mod csv_export;
pub mod document;
pub mod error;
pub mod markdown;

pub use console::{
    format_driving_time, iteration_details, results_table, solve_summary, statistics_block,
};
pub use csv_export::CsvExporter;
pub use document::ArchiveDocument;
pub use error::{ReportError, ReportResult};
pub use markdown::{generate_summary, write_markdown};
