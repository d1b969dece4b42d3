//! Error types for vrp-bench-core

use thiserror::Error;

/// Core error type
///
/// Every variant except `Config`/`MissingConfig`/`Io` corresponds to a way a
/// benchmark run can end early. None of them are fatal to the process.
#[derive(Error, Debug)]
pub enum BenchError {
    /// The fixed problem instance could not be loaded; no iteration ran
    #[error("setup failed: {0}")]
    SetupFailed(String),

    /// Solve submission failed or returned an unrecognised shape
    #[error("iteration {iteration} dispatch failed: {message}")]
    DispatchFailed {
        /// 1-based iteration index
        iteration: usize,
        /// Best available diagnostic
        message: String,
    },

    /// A status query failed while the iteration was being polled
    #[error("iteration {iteration} polling failed: {message}")]
    PollFailed {
        /// 1-based iteration index
        iteration: usize,
        /// Best available diagnostic
        message: String,
    },

    /// A run was requested while another one is active
    #[error("a benchmark run is already in progress")]
    AlreadyRunning,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A required builder component was not supplied
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// Create a setup error
    pub fn setup(message: impl Into<String>) -> Self {
        Self::SetupFailed(message.into())
    }

    /// Create a dispatch error for the given iteration
    pub fn dispatch(iteration: usize, message: impl Into<String>) -> Self {
        Self::DispatchFailed {
            iteration,
            message: message.into(),
        }
    }

    /// Create a polling error for the given iteration
    pub fn poll(iteration: usize, message: impl Into<String>) -> Self {
        Self::PollFailed {
            iteration,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a missing-configuration error
    pub fn missing_config(what: &'static str) -> Self {
        Self::MissingConfig(what)
    }

    /// The iteration this error is attributed to, if any
    pub fn iteration(&self) -> Option<usize> {
        match self {
            Self::DispatchFailed { iteration, .. } | Self::PollFailed { iteration, .. } => {
                Some(*iteration)
            }
            _ => None,
        }
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;
