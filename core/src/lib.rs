//! vrp-bench-core: Core of the iterative routing-solver benchmark
//!
//! This crate provides everything the benchmark needs apart from transport
//! and rendering:
//!
//! - Solver payloads and response classification
//! - Core traits (SolveClient, ProblemSource, Presenter)
//! - Status polling with cooperative cancellation
//! - Result archive, running statistics and consistency classification
//! - The benchmark orchestrator and single-solve session
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod config;
pub mod consistency;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod poller;
pub mod session;
pub mod signal;
pub mod solution;
pub mod traits;

pub use archive::*;
pub use config::*;
pub use consistency::*;
pub use error::*;
pub use metrics::*;
pub use orchestrator::{
    deltas, BenchmarkOrchestrator, BenchmarkRunState, IterationDelta, OrchestratorBuilder,
    RunPhase, RunningStatistics, Trend,
};
pub use poller::{PollOutcome, ResultPoller};
pub use session::{SessionOutcome, SolveSession, SolveTimings};
pub use signal::{RunFlag, RunGuard, StopSignal};
pub use solution::*;
pub use traits::*;
