//! Demo data sources.

pub mod sample;

pub use sample::{generate_records, write_sample_csv};
