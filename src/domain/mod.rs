//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - cleaned input rows (`SalesRecord`)
//! - time bucketing (`Granularity`)
//! - run configuration (`RunConfig`, `SampleConfig`)
//! - run outputs (`ChartOutcome`, `RunSummary`)

pub mod types;

pub use types::*;
