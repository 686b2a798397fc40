//! Console reporting for chart runs.

pub mod format;

pub use format::*;
