//! Input/output helpers.
//!
//! - CSV ingest, column detection and cleaning (`ingest`)
//! - charts folder handling and JSON run summaries (`output`)

pub mod ingest;
pub mod output;

pub use ingest::*;
pub use output::*;
