//! HTTP solver clients for vrp-bench
//!
//! This crate provides the reqwest-based implementation of the
//! `SolveClient` and `ProblemSource` traits for the Timefold vehicle-routing
//! REST service, together with the HTTP client configuration it is built
//! from.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod http;
pub mod timefold;

pub use http::{diagnostic_from_body, parse_base_url, ConfigValidationError, HttpConfig};
pub use timefold::{ClientBuildError, TimefoldClient};
