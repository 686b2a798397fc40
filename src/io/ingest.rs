//! CSV ingest and normalization.
//!
//! This module turns a sales CSV into a clean, date-sorted list of
//! `SalesRecord`s. Two flavors exist:
//!
//! - **Fixed schema** (`load_fixed_schema`): columns must be named exactly
//!   `date`, `sales`, `category`; the first bad value aborts the load.
//! - **Adaptive** (`load_adaptive`): columns are detected from candidate
//!   lists, bad values are coerced to "missing" and their rows dropped.
//!
//! No aggregation happens here.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{BLANK_CATEGORY, ColumnMapping, FALLBACK_CATEGORY, SalesRecord};
use crate::error::{AppError, ErrorKind};

/// Candidate column names for the date field, in priority order.
pub const DATE_CANDIDATES: [&str; 5] = ["date", "Date", "sale_date", "SaleDate", "day"];
/// Candidate column names for the sales amount field, in priority order.
pub const SALES_CANDIDATES: [&str; 6] = ["sales", "Sales", "amount", "Amount", "value", "Value"];
/// Candidate column names for the category field, in priority order.
pub const CATEGORY_CANDIDATES: [&str; 5] = ["category", "Category", "cat", "Cat", "product_category"];

/// How many raw rows are kept for the console preview.
const PREVIEW_ROWS: usize = 5;

/// Ingest output: cleaned records plus what the loader saw on the way.
#[derive(Debug, Clone)]
pub struct IngestedData {
    /// Cleaned rows, sorted by ascending date (stable).
    pub records: Vec<SalesRecord>,
    /// Header names as they appear in the file (BOM/whitespace stripped).
    pub headers: Vec<String>,
    /// The first few raw rows, before any cleaning.
    pub preview: Vec<Vec<String>>,
    /// Resolved columns (adaptive loads only).
    pub columns: Option<ColumnMapping>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedData {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_used
    }
}

/// Load a file with the fixed `date,sales,category` schema.
///
/// Any problem is fatal: missing file, missing column, or a row whose date or
/// sales value does not parse.
pub fn load_fixed_schema(path: &Path) -> Result<IngestedData, AppError> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader)?;

    let date_idx = require_exact(&headers, "date")?;
    let sales_idx = require_exact(&headers, "sales")?;
    let category_idx = require_exact(&headers, "category")?;

    let mut records = Vec::new();
    let mut preview = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| invalid_record(line, format!("CSV parse error: {e}")))?;
        push_preview(&mut preview, &record);

        let date_raw = field(&record, date_idx);
        let date = parse_date(date_raw)
            .ok_or_else(|| invalid_record(line, format!("invalid date '{date_raw}'")))?;
        let sales_raw = field(&record, sales_idx);
        let sales = parse_amount(sales_raw)
            .ok_or_else(|| invalid_record(line, format!("invalid sales value '{sales_raw}'")))?;

        records.push(SalesRecord::new(date, sales, category_label(field(&record, category_idx))));
    }

    debug!(path = %path.display(), rows = records.len(), "loaded fixed-schema dataset");
    finish(records, headers, preview, None, None)
}

/// Load a file whose column names are unknown.
///
/// Columns are resolved with [`detect_column`]. Rows with an unparseable
/// date or sales value are dropped. A missing category column yields the
/// constant category `"All"`.
pub fn load_adaptive(path: &Path) -> Result<IngestedData, AppError> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader)?;
    let columns = resolve_columns(&headers)?;

    let date_idx = index_of(&headers, &columns.date);
    let sales_idx = index_of(&headers, &columns.sales);
    let category_idx = columns.category.as_deref().map(|name| index_of(&headers, name));

    let mut records = Vec::new();
    let mut preview = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(line, error = %e, "dropping unreadable row");
                continue;
            }
        };
        push_preview(&mut preview, &record);

        let date = parse_date(field(&record, date_idx));
        let sales = parse_amount(field(&record, sales_idx));
        let (Some(date), Some(sales)) = (date, sales) else {
            debug!(line, "dropping row with missing/invalid date or sales");
            continue;
        };

        let category = match category_idx {
            Some(i) => category_label(field(&record, i)),
            None => FALLBACK_CATEGORY.to_string(),
        };
        records.push(SalesRecord::new(date, sales, category));
    }

    let dropped = rows_read - records.len();
    if dropped > 0 {
        info!(dropped, kept = records.len(), "dropped rows with invalid date or sales values");
    }

    finish(records, headers, preview, Some(columns), Some(rows_read))
}

/// Pick the column for one logical field.
///
/// Exact (case-sensitive) matches are tried first, in candidate order. If
/// none hit, columns are scanned in file order for a case-insensitive match.
/// Returns the index into `columns`.
pub fn detect_column<S: AsRef<str>>(columns: &[S], candidates: &[&str]) -> Option<usize> {
    for candidate in candidates {
        if let Some(idx) = columns.iter().position(|c| c.as_ref() == *candidate) {
            return Some(idx);
        }
    }

    let lowered: Vec<String> = candidates.iter().map(|c| c.to_lowercase()).collect();
    columns
        .iter()
        .position(|c| lowered.contains(&c.as_ref().to_lowercase()))
}

/// Resolve the date/sales/category columns of a header row.
pub fn resolve_columns(headers: &[String]) -> Result<ColumnMapping, AppError> {
    let date = detect_column(headers, &DATE_CANDIDATES).ok_or_else(|| {
        AppError::new(
            ErrorKind::UnresolvableColumn,
            format!(
                "No date column detected (looked for {}; found {}).",
                DATE_CANDIDATES.join(", "),
                headers.join(", ")
            ),
        )
    })?;
    let sales = detect_column(headers, &SALES_CANDIDATES).ok_or_else(|| {
        AppError::new(
            ErrorKind::UnresolvableColumn,
            format!(
                "No numeric sales column detected (looked for {}; found {}).",
                SALES_CANDIDATES.join(", "),
                headers.join(", ")
            ),
        )
    })?;
    let category = detect_column(headers, &CATEGORY_CANDIDATES);

    Ok(ColumnMapping {
        date: headers[date].clone(),
        sales: headers[sales].clone(),
        category: category.map(|i| headers[i].clone()),
    })
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, AppError> {
    if path.is_dir() {
        return Err(AppError::new(
            ErrorKind::MissingInputFile,
            format!("Input path '{}' is a directory, not a CSV file", path.display()),
        ));
    }
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AppError::missing_input(path),
        _ => AppError::new(
            ErrorKind::MissingInputFile,
            format!("Failed to open CSV '{}': {e}", path.display()),
        ),
    })?;

    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn read_headers(reader: &mut csv::Reader<File>) -> Result<Vec<String>, AppError> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(ErrorKind::InvalidRecord, format!("Failed to read CSV headers: {e}")))?;
    Ok(headers.iter().map(normalize_header_name).collect())
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn require_exact(headers: &[String], name: &str) -> Result<usize, AppError> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        AppError::new(
            ErrorKind::UnresolvableColumn,
            format!("Missing required column: `{name}` (found: {})", headers.join(", ")),
        )
    })
}

fn index_of(headers: &[String], name: &str) -> usize {
    // Names come from `resolve_columns`, so they are always present.
    headers.iter().position(|h| h == name).unwrap_or(0)
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn push_preview(preview: &mut Vec<Vec<String>>, record: &StringRecord) {
    if preview.len() < PREVIEW_ROWS {
        preview.push(record.iter().map(str::to_string).collect());
    }
}

fn invalid_record(line: usize, message: String) -> AppError {
    AppError::new(ErrorKind::InvalidRecord, format!("Line {line}: {message}"))
}

fn finish(
    mut records: Vec<SalesRecord>,
    headers: Vec<String>,
    preview: Vec<Vec<String>>,
    columns: Option<ColumnMapping>,
    rows_read: Option<usize>,
) -> Result<IngestedData, AppError> {
    let rows_used = records.len();
    let rows_read = rows_read.unwrap_or(rows_used);

    if rows_used == 0 {
        return Err(AppError::new(
            ErrorKind::EmptyDataset,
            "No valid rows after cleaning. Check your CSV data.",
        ));
    }

    records.sort_by_key(|r| r.date);

    Ok(IngestedData {
        records,
        headers,
        preview,
        columns,
        rows_read,
        rows_used,
    })
}

fn category_label(raw: &str) -> String {
    if raw.is_empty() {
        BLANK_CATEGORY.to_string()
    } else {
        raw.to_string()
    }
}

/// Parse a calendar date, dropping any time-of-day component.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Parse a finite sales amount.
pub fn parse_amount(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
