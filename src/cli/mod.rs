//! Command-line parsing for the sales chart generator.
//!
//! Argument parsing and command dispatch stay here, away from the loading,
//! aggregation and rendering code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales-charts", version, about = "Static PNG sales charts from a CSV file")]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fixed-schema charts (date, sales, category): daily, monthly, by category.
    Make(ChartArgs),
    /// Detect columns, clean rows, then draw weekly, quarterly, pie and grouped charts.
    Regenerate(ChartArgs),
    /// Write a seeded synthetic sales CSV.
    Sample(SampleArgs),
}

/// Options shared by `make` and `regenerate`.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Project root; data and chart paths default relative to it.
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Input CSV [env: SALES_CHARTS_DATA] (default: <project>/data/sales.csv).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Output folder [env: SALES_CHARTS_DIR] (default: <project>/outputs/charts).
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// TTF font for chart text [env: SALES_CHARTS_FONT].
    #[arg(long, value_name = "TTF")]
    pub font: Option<PathBuf>,

    /// Write a JSON run summary to this path.
    #[arg(long, value_name = "JSON")]
    pub summary: Option<PathBuf>,
}

/// Options for `sample`.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Output CSV [env: SALES_CHARTS_DATA] (default: <project>/data/sales.csv).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Number of consecutive days to generate.
    #[arg(long, default_value_t = 365)]
    pub days: u32,

    /// First day of the sample (YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    pub start: NaiveDate,

    /// Random seed; the same seed always gives the same file.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Comma-separated category names.
    #[arg(long, value_delimiter = ',', default_value = "Electronics,Clothing,Home,Books")]
    pub categories: Vec<String>,
}
