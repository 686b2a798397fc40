//! `sales-charts` library crate.
//!
//! The binary (`sales-charts`) is a thin wrapper around this library so that:
//!
//! - loading, aggregation and rendering are testable without spawning processes
//! - the pipelines can be driven from other front-ends
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
