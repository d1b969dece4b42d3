//! Orchestrator for benchmark run lifecycle management
//!
//! The BenchmarkOrchestrator drives a complete run:
//! - Loading the demo problem instance
//! - Dispatching chained solve iterations and polling job handles
//! - Archiving results and recomputing statistics after every iteration
//! - Stopping cooperatively through a single run flag
//!
//! # Example
//!
//! ```ignore
//! use vrp_bench_core::{BenchmarkConfig, DemoDataset, OrchestratorBuilder};
//!
//! let orchestrator = Arc::new(
//!     OrchestratorBuilder::new()
//!         .client(client.clone())
//!         .source(client)
//!         .build()?,
//! );
//!
//! let state = orchestrator
//!     .run_with_signal_handling(BenchmarkConfig::new(5, DemoDataset::SingaporeWide))
//!     .await?;
//! ```

mod aggregator;
mod builder;
mod executor;
mod state;

pub use aggregator::{deltas, IterationDelta, RunningStatistics, Trend};
pub use builder::OrchestratorBuilder;
pub use executor::BenchmarkOrchestrator;
pub use state::{BenchmarkRunState, RunPhase};

#[cfg(test)]
mod tests;
