//! Formatted terminal output for chart runs.
//!
//! Everything the user reads on stdout is built here, so the pipelines stay
//! free of presentation details.

use std::path::Path;

use crate::domain::{ChartOutcome, ColumnMapping, PipelineKind, RunConfig, RunSummary};
use crate::io::ingest::IngestedData;

/// Widest a preview cell may be before it is truncated.
const MAX_CELL: usize = 24;

/// Paths used by the run.
pub fn format_paths(config: &RunConfig) -> String {
    format!(
        "Data file: {}\nCharts folder: {}\n",
        config.data_path.display(),
        config.charts_dir.display()
    )
}

/// PNG files already present in the charts folder.
pub fn format_existing_charts(names: &[String]) -> String {
    let mut out = String::from("Existing PNGs in charts folder:\n");
    if names.is_empty() {
        out.push_str(" (none found)\n");
    }
    for name in names {
        out.push_str(&format!(" - {name}\n"));
    }
    out
}

/// Header list plus the first rows, as an aligned table.
pub fn format_preview(data: &IngestedData) -> String {
    let mut out = format!("CSV columns: {}\n", data.headers.join(", "));
    out.push_str(&format!("First {} rows:\n", data.preview.len()));

    let cols = data.headers.len().max(data.preview.iter().map(Vec::len).max().unwrap_or(0));
    let cell = |row: &[String], i: usize| truncate(row.get(i).map(String::as_str).unwrap_or(""), MAX_CELL);

    let mut widths = vec![0usize; cols];
    for (i, width) in widths.iter_mut().enumerate() {
        *width = std::iter::once(cell(data.headers.as_slice(), i))
            .chain(data.preview.iter().map(|row| cell(row.as_slice(), i)))
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);
    }

    let render_row = |row: &[String]| {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| format!("{:>w$}", cell(row, i), w = *w))
            .collect();
        format!(" {}\n", cells.join("  ").trim_end())
    };

    out.push_str(&render_row(data.headers.as_slice()));
    for row in &data.preview {
        out.push_str(&render_row(row.as_slice()));
    }
    out
}

/// Which columns were picked for date/sales/category.
pub fn format_detected_columns(columns: &ColumnMapping) -> String {
    format!(
        "Detected columns -> date: {}  sales: {}  category: {}\n",
        columns.date,
        columns.sales,
        columns.category.as_deref().unwrap_or("(none, using \"All\")")
    )
}

pub fn format_row_counts(data: &IngestedData) -> String {
    if data.rows_dropped() == 0 {
        format!("After cleaning: rows = {}\n", data.rows_used)
    } else {
        format!(
            "After cleaning: rows = {} ({} dropped with invalid date or sales)\n",
            data.rows_used,
            data.rows_dropped()
        )
    }
}

/// One line per chart step.
pub fn format_outcome(outcome: &ChartOutcome) -> String {
    match outcome {
        ChartOutcome::Saved { path, .. } => format!("Saved: {}", path.display()),
        ChartOutcome::Skipped { chart, reason } => format!("Skipping {chart}: {reason}"),
    }
}

/// Closing summary for a run.
pub fn format_run_summary(summary: &RunSummary, charts_dir: &Path) -> String {
    let name = match summary.pipeline {
        PipelineKind::Basic => "make",
        PipelineKind::Adaptive => "regenerate",
    };
    let skipped = summary.charts.len() - summary.saved_count();

    let mut out = format!(
        "=== sales-charts {name} ===\nInput: {} | rows used {}/{}\nCharts: {} saved, {} skipped -> {}\n",
        summary.input.display(),
        summary.rows_used,
        summary.rows_read,
        summary.saved_count(),
        skipped,
        charts_dir.display(),
    );
    if let Some(failure) = &summary.failure {
        out.push_str(&format!("Stopped early: {failure}\n"));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
