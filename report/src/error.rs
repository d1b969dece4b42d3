//! Error types for vrp-bench-report

use std::path::PathBuf;

use thiserror::Error;

/// Report error type
#[derive(Error, Debug)]
pub enum ReportError {
    /// Reading or writing a report file failed
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The requested iteration is not in the archive
    #[error("iteration {index} not found (archive holds {available})")]
    IterationNotFound {
        /// Requested 1-based index
        index: usize,
        /// Number of archived iterations
        available: usize,
    },
}

impl ReportError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias
pub type ReportResult<T> = std::result::Result<T, ReportError>;
