//! Shared chart pipelines used by the `make` and `regenerate` commands.
//!
//! Both pipelines follow the same shape:
//! load -> aggregate -> render, one chart at a time.
//!
//! They differ in how the input is read (fixed schema vs detected columns)
//! and in what happens when a chart fails to render. Printing is left to
//! `app`, so these functions only return data.

use crate::aggregate::{self, CategoryOrder};
use crate::chart::{BarChart, ChartRenderer, ChartStyle, GroupedBarChart, LineChart, Marker, PieChart, fonts};
use crate::domain::{ChartOutcome, Granularity, PipelineKind, RunConfig, RunSummary, SalesRecord};
use crate::error::AppError;
use crate::io::ingest::{IngestedData, load_fixed_schema};
use crate::io::output::prepare_charts_dir;

pub const DAILY_CHART: &str = "daily_sales";
pub const MONTHLY_CHART: &str = "monthly_sales";
pub const CATEGORY_BAR_CHART: &str = "category_sales_bar";

pub const WEEKLY_CHART: &str = "weekly_sales";
pub const QUARTERLY_CHART: &str = "quarterly_sales";
pub const CATEGORY_PIE_CHART: &str = "category_share_pie";
pub const GROUPED_CHART: &str = "monthly_by_category_grouped";

/// All outputs of a single chart run.
#[derive(Debug)]
pub struct RunOutput {
    pub data: IngestedData,
    pub summary: RunSummary,
    /// First render failure of an adaptive run; later charts were not attempted.
    pub failure: Option<AppError>,
}

/// Renderer configured from the run's output dir, dpi and font settings.
pub fn renderer_for(config: &RunConfig) -> ChartRenderer {
    let text = fonts::ensure_fonts(config.font_path.as_deref());
    ChartRenderer::new(
        &config.charts_dir,
        ChartStyle {
            dpi: config.dpi,
            text,
        },
    )
}

/// Fixed-schema pipeline: daily, monthly and category charts.
///
/// Fail-fast: the first load or render error ends the run.
pub fn run_basic(config: &RunConfig) -> Result<RunOutput, AppError> {
    let data = load_fixed_schema(&config.data_path)?;
    prepare_charts_dir(&config.charts_dir)?;

    let renderer = renderer_for(config);
    let charts = basic_charts(&data.records, &renderer)?;

    let mut summary = summary_for(PipelineKind::Basic, config, &data);
    summary.charts = charts;

    Ok(RunOutput {
        data,
        summary,
        failure: None,
    })
}

/// Adaptive pipeline over an already loaded dataset.
///
/// Only a charts-dir failure is returned as `Err`. A render failure stops the
/// remaining charts and is reported through `RunOutput::failure`, with every
/// outcome produced before it kept in the summary.
pub fn run_adaptive(config: &RunConfig, data: IngestedData) -> Result<RunOutput, AppError> {
    prepare_charts_dir(&config.charts_dir)?;

    let renderer = renderer_for(config);
    let mut summary = summary_for(PipelineKind::Adaptive, config, &data);
    let failure = adaptive_charts(
        &data.records,
        &renderer,
        config.max_grouped_periods,
        &mut summary.charts,
    )
    .err();
    summary.failure = failure.as_ref().map(|e| e.message().to_string());

    Ok(RunOutput {
        data,
        summary,
        failure,
    })
}

/// Daily line, monthly line (circle markers), category bar.
pub fn basic_charts(records: &[SalesRecord], renderer: &ChartRenderer) -> Result<Vec<ChartOutcome>, AppError> {
    let mut outcomes = Vec::with_capacity(3);

    let daily = aggregate::daily(records).labeled(|d| Granularity::Day.label(*d));
    outcomes.push(renderer.render(
        DAILY_CHART,
        &LineChart::new("Daily Sales", &daily).axes("date", "sales"),
    )?);

    let monthly = aggregate::resample(records, Granularity::Month).labeled(|d| Granularity::Month.label(*d));
    outcomes.push(renderer.render(
        MONTHLY_CHART,
        &LineChart::new("Monthly Sales", &monthly)
            .axes("Month", "sales")
            .marker(Marker::Circle),
    )?);

    let categories = aggregate::by_category(records, CategoryOrder::Natural).labeled(|c| c.clone());
    outcomes.push(renderer.render(
        CATEGORY_BAR_CHART,
        &BarChart::new("Sales by Category", &categories),
    )?);

    Ok(outcomes)
}

/// Weekly line, quarterly line (square markers), category pie, grouped bars.
///
/// Outcomes are pushed as they are produced, so `outcomes` holds everything
/// that finished before an error.
pub fn adaptive_charts(
    records: &[SalesRecord],
    renderer: &ChartRenderer,
    max_grouped_periods: usize,
    outcomes: &mut Vec<ChartOutcome>,
) -> Result<(), AppError> {
    let weekly = aggregate::resample(records, Granularity::Week).labeled(|d| Granularity::Week.label(*d));
    outcomes.push(renderer.render(WEEKLY_CHART, &LineChart::new("Weekly Sales", &weekly))?);

    let quarterly =
        aggregate::resample(records, Granularity::Quarter).labeled(|d| Granularity::Quarter.label(*d));
    outcomes.push(renderer.render(
        QUARTERLY_CHART,
        &LineChart::new("Quarterly Sales", &quarterly)
            .marker(Marker::Square)
            .size(9.0, 4.0),
    )?);

    let shares = aggregate::by_category(records, CategoryOrder::DescendingTotal).labeled(|c| c.clone());
    outcomes.push(renderer.render(
        CATEGORY_PIE_CHART,
        &PieChart::new("Category Share (Overall)", &shares),
    )?);

    let table = aggregate::monthly_by_category(records, max_grouped_periods);
    let row_labels = table.periods.iter().map(|d| Granularity::Month.label(*d)).collect();
    let title = format!("Monthly Sales by Category (last {max_grouped_periods} months)");
    outcomes.push(renderer.render(
        GROUPED_CHART,
        &GroupedBarChart::new(&title, &table, row_labels),
    )?);

    Ok(())
}

fn summary_for(pipeline: PipelineKind, config: &RunConfig, data: &IngestedData) -> RunSummary {
    let mut summary = RunSummary::new(pipeline, config.data_path.clone());
    summary.rows_read = data.rows_read;
    summary.rows_used = data.rows_used;
    summary.columns = data.columns.clone();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::io::ingest::load_adaptive;
    use std::path::Path;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn config(dir: &Path, data: &Path) -> RunConfig {
        let mut config = RunConfig::new(data, dir.join("outputs/charts"));
        config.dpi = 30;
        config
    }

    fn saved(summary: &RunSummary) -> Vec<&str> {
        summary
            .charts
            .iter()
            .filter(|c| c.is_saved())
            .map(ChartOutcome::chart)
            .collect()
    }

    const BASIC_CSV: &str = "date,sales,category\n\
        2024-01-01,100,A\n\
        2024-01-01,50,B\n\
        2024-01-02,25,A\n\
        2024-02-10,40,B\n";

    #[test]
    fn basic_run_writes_three_charts() {
        let dir = tempfile::tempdir().unwrap();
        let data = write(dir.path(), "sales.csv", BASIC_CSV);
        let config = config(dir.path(), &data);

        let out = run_basic(&config).unwrap();
        assert_eq!(saved(&out.summary), vec![DAILY_CHART, MONTHLY_CHART, CATEGORY_BAR_CHART]);
        assert_eq!(out.summary.rows_used, 4);
        for name in ["daily_sales.png", "monthly_sales.png", "category_sales_bar.png"] {
            assert!(config.charts_dir.join(name).is_file(), "{name} missing");
        }
    }

    #[test]
    fn basic_run_fails_fast_on_bad_row() {
        let dir = tempfile::tempdir().unwrap();
        let data = write(dir.path(), "sales.csv", "date,sales,category\n2024-01-01,abc,A\n");
        let config = config(dir.path(), &data);

        let err = run_basic(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
        assert!(!config.charts_dir.exists());
    }

    #[test]
    fn basic_run_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), &dir.path().join("nope.csv"));
        assert_eq!(run_basic(&config).unwrap_err().kind(), ErrorKind::MissingInputFile);
    }

    #[test]
    fn adaptive_run_writes_four_charts() {
        let dir = tempfile::tempdir().unwrap();
        let mut csv = String::from("Day,Amount,Cat\n");
        for month in 1..=9 {
            csv.push_str(&format!("2024-{month:02}-03,{},A\n", month * 10));
            csv.push_str(&format!("2024-{month:02}-17,5,B\n"));
        }
        csv.push_str("not-a-date,5,A\n");
        let data_path = write(dir.path(), "sales.csv", &csv);
        let config = config(dir.path(), &data_path);

        let data = load_adaptive(&data_path).unwrap();
        assert_eq!(data.rows_dropped(), 1);

        let out = run_adaptive(&config, data).unwrap();
        assert!(out.failure.is_none());
        assert_eq!(
            saved(&out.summary),
            vec![WEEKLY_CHART, QUARTERLY_CHART, CATEGORY_PIE_CHART, GROUPED_CHART]
        );
        let columns = out.summary.columns.as_ref().unwrap();
        assert_eq!(columns.date, "Day");
        assert_eq!(columns.category.as_deref(), Some("Cat"));
    }

    #[test]
    fn adaptive_run_skips_pie_when_total_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = write(dir.path(), "sales.csv", "date,value\n2024-01-01,0\n2024-02-01,0\n");
        let config = config(dir.path(), &data_path);

        let out = run_adaptive(&config, load_adaptive(&data_path).unwrap()).unwrap();
        assert!(out.failure.is_none());

        let pie = out.summary.charts.iter().find(|c| c.chart() == CATEGORY_PIE_CHART).unwrap();
        assert!(!pie.is_saved());
        assert!(!config.charts_dir.join("category_share_pie.png").exists());
        assert_eq!(out.summary.saved_count(), 3);
    }

    #[test]
    fn adaptive_run_stops_at_first_render_failure() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "date,sales,category\n2024-01-01,100,A\n2024-01-02,-20,B\n";
        let data_path = write(dir.path(), "sales.csv", csv);
        let config = config(dir.path(), &data_path);

        let out = run_adaptive(&config, load_adaptive(&data_path).unwrap()).unwrap();
        let failure = out.failure.as_ref().unwrap();
        assert_eq!(failure.kind(), ErrorKind::RenderFailure);
        assert!(out.summary.failure.is_some());

        // Weekly and quarterly finished; the pie failed; grouped was never tried.
        assert_eq!(saved(&out.summary), vec![WEEKLY_CHART, QUARTERLY_CHART]);
        assert!(config.charts_dir.join("weekly_sales.png").is_file());
        assert!(!config.charts_dir.join("monthly_by_category_grouped.png").exists());
    }
}
