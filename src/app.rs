//! Top-level application orchestration.
//!
//! `src/main.rs` is tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves paths from flags, `.env`/environment and defaults
//! - runs the basic or adaptive chart pipeline
//! - prints progress and the closing summary
//! - writes the optional JSON summary and sample CSV

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::debug;

use crate::cli::{ChartArgs, Command, SampleArgs};
use crate::domain::{RunConfig, RunSummary, SampleConfig};
use crate::error::AppError;
use crate::io::ingest::load_adaptive;
use crate::io::output::{existing_charts, write_summary_json};
use crate::report;

pub mod pipeline;

pub const DATA_ENV: &str = "SALES_CHARTS_DATA";
pub const CHARTS_DIR_ENV: &str = "SALES_CHARTS_DIR";

/// Entry point for the `sales-charts` binary.
pub fn run() -> Result<(), AppError> {
    // `sales-charts` and `sales-charts --data x.csv` behave like `sales-charts make ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    match cli.command {
        Command::Make(args) => handle_make(&args),
        Command::Regenerate(args) => handle_regenerate(&args),
        Command::Sample(args) => handle_sample(&args),
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout is reserved for the progress report.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_make(args: &ChartArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args, env_var);
    let run = pipeline::run_basic(&config)?;

    for outcome in &run.summary.charts {
        println!("{}", report::format_outcome(outcome));
    }
    finish_summary(&config, &run.summary)?;

    println!("All charts generated successfully!");
    Ok(())
}

fn handle_regenerate(args: &ChartArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args, env_var);

    println!("{}", report::format_paths(&config));
    println!("{}", report::format_existing_charts(&existing_charts(&config.charts_dir)?));

    let data = load_adaptive(&config.data_path)?;

    println!("{}", report::format_preview(&data));
    if let Some(columns) = &data.columns {
        print!("{}", report::format_detected_columns(columns));
    }
    println!("{}", report::format_row_counts(&data));

    let run = pipeline::run_adaptive(&config, data)?;
    for outcome in &run.summary.charts {
        println!("{}", report::format_outcome(outcome));
    }
    finish_summary(&config, &run.summary)?;

    if let Some(err) = run.failure {
        return Err(err);
    }
    println!("Done. Check {} for the newly created images.", config.charts_dir.display());
    Ok(())
}

fn handle_sample(args: &SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(args, env_var);
    let rows = crate::data::write_sample_csv(&config)?;
    println!("Wrote {rows} sample rows to {}", config.data_path.display());
    Ok(())
}

/// Print the closing summary and write the JSON copy if requested.
fn finish_summary(config: &RunConfig, summary: &RunSummary) -> Result<(), AppError> {
    println!();
    print!("{}", report::format_run_summary(summary, &config.charts_dir));
    if let Some(path) = &config.summary_path {
        let written = write_summary_json(path, summary)?;
        println!("Summary: {}", written.display());
    }
    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve chart-run settings: flag, then environment, then project default.
pub fn run_config_from_args(args: &ChartArgs, env: impl Fn(&str) -> Option<String>) -> RunConfig {
    let data_path = resolve(&args.data, &env, DATA_ENV, || default_data_path(&args.project));
    let charts_dir = resolve(&args.charts_dir, &env, CHARTS_DIR_ENV, || {
        args.project.join("outputs").join("charts")
    });

    let mut config = RunConfig::new(data_path, charts_dir);
    config.font_path = args.font.clone();
    config.summary_path = args.summary.clone();
    debug!(?config, "resolved run config");
    config
}

pub fn sample_config_from_args(args: &SampleArgs, env: impl Fn(&str) -> Option<String>) -> SampleConfig {
    SampleConfig {
        data_path: resolve(&args.data, &env, DATA_ENV, || default_data_path(&args.project)),
        start: args.start,
        days: args.days,
        seed: args.seed,
        categories: args.categories.clone(),
    }
}

fn resolve(
    flag: &Option<PathBuf>,
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: impl FnOnce() -> PathBuf,
) -> PathBuf {
    flag.clone()
        .or_else(|| env(key).map(PathBuf::from))
        .unwrap_or_else(default)
}

fn default_data_path(project: &Path) -> PathBuf {
    project.join("data").join("sales.csv")
}

/// Rewrite argv so `sales-charts` defaults to `sales-charts make`.
///
/// Rules:
/// - `sales-charts`                      -> `sales-charts make`
/// - `sales-charts --data x.csv ...`     -> `sales-charts make --data x.csv ...`
/// - `sales-charts --help/--version/-h`  -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("make".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "make" | "regenerate" | "sample");
    if is_subcommand {
        return argv;
    }

    // Global verbosity flags are fine before the subcommand.
    if arg1.starts_with('-') && !is_verbose_flag(&arg1) {
        argv.insert(1, "make".to_string());
        return argv;
    }
    if is_verbose_flag(&arg1) && argv.len() == 2 {
        argv.push("make".to_string());
    }

    argv
}

fn is_verbose_flag(arg: &str) -> bool {
    arg == "--verbose" || (arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v'))
}
