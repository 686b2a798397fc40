//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation and rendering
//! - printed as a console summary
//! - exported to JSON after a run

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default output resolution for every chart.
pub const DEFAULT_DPI: u32 = 300;

/// How many of the most recent months the grouped monthly-by-category chart keeps.
pub const GROUPED_MONTHS: usize = 6;

/// Category label used when the input has no category column.
pub const FALLBACK_CATEGORY: &str = "All";

/// Category label used when a category cell is present but blank.
pub const BLANK_CATEGORY: &str = "Uncategorized";

/// One cleaned row of input data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub sales: f64,
    pub category: String,
}

impl SalesRecord {
    pub fn new(date: NaiveDate, sales: f64, category: impl Into<String>) -> Self {
        Self {
            date,
            sales,
            category: category.into(),
        }
    }
}

/// Time bucket used as an aggregation key.
///
/// Buckets are identified by their *period-end* date:
///
/// - `Day`: the date itself
/// - `Week`: the Sunday closing the Monday..Sunday week
/// - `Month`: the last day of the month
/// - `Quarter`: Mar 31, Jun 30, Sep 30 or Dec 31
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
}

impl Granularity {
    /// Map a date to the end date of the bucket containing it.
    pub fn bucket_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => {
                let to_sunday = 6 - date.weekday().num_days_from_monday();
                date + chrono::Duration::days(i64::from(to_sunday))
            }
            Granularity::Month => date
                .with_day(days_in_month(date.year(), date.month()))
                .unwrap_or(date),
            Granularity::Quarter => {
                let end_month = (date.month() - 1) / 3 * 3 + 3;
                NaiveDate::from_ymd_opt(date.year(), end_month, days_in_month(date.year(), end_month))
                    .unwrap_or(date)
            }
        }
    }

    /// The bucket immediately after `bucket` (which must be a bucket end).
    pub fn next_bucket(self, bucket: NaiveDate) -> Option<NaiveDate> {
        bucket.succ_opt().map(|d| self.bucket_of(d))
    }

    /// Axis label for a bucket.
    pub fn label(self, bucket: NaiveDate) -> String {
        match self {
            Granularity::Day | Granularity::Week => bucket.format("%Y-%m-%d").to_string(),
            Granularity::Month => bucket.format("%Y-%m").to_string(),
            Granularity::Quarter => format!("{}Q{}", bucket.year(), (bucket.month() - 1) / 3 + 1),
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Which input columns the adaptive loader resolved for each logical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: String,
    pub sales: String,
    /// `None` means no category column was found and every row is labeled `"All"`.
    pub category: Option<String>,
}

/// Result of one chart-generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChartOutcome {
    Saved { chart: String, path: PathBuf },
    Skipped { chart: String, reason: String },
}

impl ChartOutcome {
    pub fn chart(&self) -> &str {
        match self {
            ChartOutcome::Saved { chart, .. } | ChartOutcome::Skipped { chart, .. } => chart,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, ChartOutcome::Saved { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Basic,
    Adaptive,
}

/// Everything a run did, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub pipeline: PipelineKind,
    pub input: PathBuf,
    pub rows_read: usize,
    pub rows_used: usize,
    pub columns: Option<ColumnMapping>,
    pub charts: Vec<ChartOutcome>,
    /// Set when the run stopped early on a render failure.
    pub failure: Option<String>,
}

impl RunSummary {
    pub fn new(pipeline: PipelineKind, input: PathBuf) -> Self {
        Self {
            pipeline,
            input,
            rows_read: 0,
            rows_used: 0,
            columns: None,
            charts: Vec::new(),
            failure: None,
        }
    }

    pub fn saved_count(&self) -> usize {
        self.charts.iter().filter(|c| c.is_saved()).count()
    }
}

/// Chart run configuration.
///
/// This is derived from CLI flags, then environment, then defaults.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: PathBuf,
    pub charts_dir: PathBuf,
    /// Explicit TTF file for chart text; system fonts are searched otherwise.
    pub font_path: Option<PathBuf>,
    pub dpi: u32,
    pub max_grouped_periods: usize,
    /// Optional JSON export of the run summary.
    pub summary_path: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(data_path: impl Into<PathBuf>, charts_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            charts_dir: charts_dir.into(),
            font_path: None,
            dpi: DEFAULT_DPI,
            max_grouped_periods: GROUPED_MONTHS,
            summary_path: None,
        }
    }
}

/// Synthetic dataset configuration for `sales-charts sample`.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub data_path: PathBuf,
    pub start: NaiveDate,
    pub days: u32,
    pub seed: u64,
    pub categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_buckets_end_on_sunday() {
        // 2024-01-01 is a Monday.
        assert_eq!(Granularity::Week.bucket_of(d(2024, 1, 1)), d(2024, 1, 7));
        assert_eq!(Granularity::Week.bucket_of(d(2024, 1, 7)), d(2024, 1, 7));
        assert_eq!(Granularity::Week.bucket_of(d(2024, 1, 8)), d(2024, 1, 14));
    }

    #[test]
    fn month_and_quarter_buckets_end_on_last_day() {
        assert_eq!(Granularity::Month.bucket_of(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(Granularity::Month.bucket_of(d(2023, 2, 10)), d(2023, 2, 28));
        assert_eq!(Granularity::Quarter.bucket_of(d(2024, 5, 3)), d(2024, 6, 30));
        assert_eq!(Granularity::Quarter.bucket_of(d(2024, 12, 31)), d(2024, 12, 31));
    }

    #[test]
    fn next_bucket_rolls_over_year() {
        assert_eq!(Granularity::Month.next_bucket(d(2024, 12, 31)), Some(d(2025, 1, 31)));
        assert_eq!(Granularity::Quarter.next_bucket(d(2024, 12, 31)), Some(d(2025, 3, 31)));
        assert_eq!(Granularity::Week.next_bucket(d(2024, 1, 7)), Some(d(2024, 1, 14)));
    }

    #[test]
    fn labels() {
        assert_eq!(Granularity::Month.label(d(2024, 1, 31)), "2024-01");
        assert_eq!(Granularity::Quarter.label(d(2024, 9, 30)), "2024Q3");
        assert_eq!(Granularity::Day.label(d(2024, 2, 1)), "2024-02-01");
    }
}
