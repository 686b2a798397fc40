//! Grouping and summing of sales records.
//!
//! Every chart is fed by one of these aggregations. Results are plain ordered
//! `(key, total)` lists, built fresh per chart and never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::domain::{Granularity, SalesRecord};

/// Ordered `(key, total)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals<K> {
    entries: Vec<(K, f64)>,
}

impl<K> Totals<K> {
    pub fn from_entries(entries: Vec<(K, f64)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(K, f64)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn sum(&self) -> f64 {
        self.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relabel keys for display, keeping order.
    pub fn labeled(&self, label: impl Fn(&K) -> String) -> Vec<(String, f64)> {
        self.entries.iter().map(|(k, v)| (label(k), *v)).collect()
    }
}

/// Ordering for category aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOrder {
    /// Lexicographic label order.
    Natural,
    /// Largest total first; ties keep natural order.
    DescendingTotal,
}

/// Sum `sales` per key, keys in natural (`Ord`) order.
pub fn sum_by<K, F>(records: &[SalesRecord], key_fn: F) -> Totals<K>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
{
    let mut groups: BTreeMap<K, f64> = BTreeMap::new();
    for record in records {
        *groups.entry(key_fn(record)).or_insert(0.0) += record.sales;
    }
    Totals::from_entries(groups.into_iter().collect())
}

/// Totals per exact calendar date, ascending. Dates without sales are absent.
pub fn daily(records: &[SalesRecord]) -> Totals<NaiveDate> {
    sum_by(records, |r| r.date)
}

/// Totals per time bucket, ascending by bucket end date.
///
/// Every bucket between the first and last one is present; buckets without
/// any sales carry a total of zero.
pub fn resample(records: &[SalesRecord], granularity: Granularity) -> Totals<NaiveDate> {
    let sparse = sum_by(records, |r| granularity.bucket_of(r.date));
    let (Some(first), Some(last)) = (sparse.keys().next().copied(), sparse.keys().last().copied()) else {
        return sparse;
    };

    let lookup: BTreeMap<NaiveDate, f64> = sparse.entries.into_iter().collect();
    let mut entries = Vec::with_capacity(lookup.len());
    let mut bucket = first;
    loop {
        entries.push((bucket, lookup.get(&bucket).copied().unwrap_or(0.0)));
        if bucket >= last {
            break;
        }
        match granularity.next_bucket(bucket) {
            Some(next) => bucket = next,
            None => break,
        }
    }
    Totals::from_entries(entries)
}

/// Totals per category label.
pub fn by_category(records: &[SalesRecord], order: CategoryOrder) -> Totals<String> {
    let mut totals = sum_by(records, |r| r.category.clone());
    if order == CategoryOrder::DescendingTotal {
        // Stable sort over the natural order keeps ties alphabetical.
        totals
            .entries
            .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    }
    totals
}

/// Month × category totals.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    /// Month-end dates, ascending.
    pub periods: Vec<NaiveDate>,
    /// Category labels, natural order.
    pub categories: Vec<String>,
    /// `values[row][col]` is the total for `periods[row]` × `categories[col]`.
    pub values: Vec<Vec<f64>>,
}

impl CategoryTable {
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn row_total(&self, row: usize) -> f64 {
        self.values.get(row).map(|r| r.iter().sum()).unwrap_or(0.0)
    }

    pub fn max_value(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min_value(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }
}

/// Monthly totals split by category, trimmed to the most recent `max_periods`
/// months that contain data.
///
/// Every category in `records` becomes a column, even one whose sales all
/// fall in trimmed months; missing cells are zero.
pub fn monthly_by_category(records: &[SalesRecord], max_periods: usize) -> CategoryTable {
    let cells = sum_by(records, |r| (Granularity::Month.bucket_of(r.date), r.category.clone()));

    let all_periods: BTreeSet<NaiveDate> = cells.keys().map(|(month, _)| *month).collect();
    let categories: Vec<String> = cells
        .keys()
        .map(|(_, cat)| cat.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let skip = all_periods.len().saturating_sub(max_periods);
    let periods: Vec<NaiveDate> = all_periods.into_iter().skip(skip).collect();
    let Some(cutoff) = periods.first().copied() else {
        return CategoryTable {
            periods,
            categories,
            values: Vec::new(),
        };
    };

    let mut values = vec![vec![0.0; categories.len()]; periods.len()];
    for ((month, cat), total) in cells.entries().iter().filter(|((month, _), _)| *month >= cutoff) {
        let row = periods.binary_search(month);
        let col = categories.binary_search(cat);
        if let (Ok(row), Ok(col)) = (row, col) {
            values[row][col] = *total;
        }
    }

    CategoryTable {
        periods,
        categories,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn example() -> Vec<SalesRecord> {
        vec![
            SalesRecord::new(d(2024, 1, 1), 100.0, "X"),
            SalesRecord::new(d(2024, 1, 2), 50.0, "Y"),
            SalesRecord::new(d(2024, 2, 1), 75.0, "X"),
        ]
    }

    #[test]
    fn end_to_end_example_totals() {
        let records = example();

        let days = daily(&records);
        assert_eq!(
            days.entries(),
            &[(d(2024, 1, 1), 100.0), (d(2024, 1, 2), 50.0), (d(2024, 2, 1), 75.0)]
        );

        let months = resample(&records, Granularity::Month);
        assert_eq!(
            months.labeled(|k| Granularity::Month.label(*k)),
            vec![("2024-01".to_string(), 150.0), ("2024-02".to_string(), 75.0)]
        );

        let cats = by_category(&records, CategoryOrder::Natural);
        assert_eq!(cats.entries(), &[("X".to_string(), 175.0), ("Y".to_string(), 50.0)]);
    }

    #[test]
    fn totals_are_conserved_across_groupings() {
        let mut records = Vec::new();
        let cats = ["A", "B", "C"];
        for i in 0..200u32 {
            let date = d(2023, 1, 1) + chrono::Duration::days(i64::from(i * 3));
            records.push(SalesRecord::new(date, f64::from(i % 17) * 2.5, cats[(i % 3) as usize]));
        }
        let expected: f64 = records.iter().map(|r| r.sales).sum();

        for total in [
            daily(&records).sum(),
            resample(&records, Granularity::Week).sum(),
            resample(&records, Granularity::Month).sum(),
            resample(&records, Granularity::Quarter).sum(),
            by_category(&records, CategoryOrder::Natural).sum(),
        ] {
            assert!((total - expected).abs() < 1e-9, "{total} != {expected}");
        }
    }

    #[test]
    fn resample_fills_empty_periods_with_zero() {
        let records = vec![
            SalesRecord::new(d(2024, 1, 15), 10.0, "A"),
            SalesRecord::new(d(2024, 4, 2), 5.0, "A"),
        ];
        let months = resample(&records, Granularity::Month);
        assert_eq!(
            months.entries(),
            &[
                (d(2024, 1, 31), 10.0),
                (d(2024, 2, 29), 0.0),
                (d(2024, 3, 31), 0.0),
                (d(2024, 4, 30), 5.0),
            ]
        );

        let quarters = resample(&records, Granularity::Quarter);
        assert_eq!(quarters.entries(), &[(d(2024, 3, 31), 10.0), (d(2024, 6, 30), 5.0)]);
    }

    #[test]
    fn weekly_buckets_are_chronological() {
        let records = vec![
            SalesRecord::new(d(2024, 1, 10), 1.0, "A"),
            SalesRecord::new(d(2024, 1, 1), 2.0, "A"),
            SalesRecord::new(d(2024, 1, 7), 3.0, "A"),
        ];
        let weeks = resample(&records, Granularity::Week);
        assert_eq!(weeks.entries(), &[(d(2024, 1, 7), 5.0), (d(2024, 1, 14), 1.0)]);
    }

    #[test]
    fn pie_order_is_descending_total() {
        let records = vec![
            SalesRecord::new(d(2024, 1, 1), 30.0, "A"),
            SalesRecord::new(d(2024, 1, 2), 70.0, "B"),
        ];
        let totals = by_category(&records, CategoryOrder::DescendingTotal);
        let keys: Vec<&String> = totals.keys().collect();
        assert_eq!(keys, vec!["B", "A"]);

        let natural = by_category(&records, CategoryOrder::Natural);
        assert_eq!(natural.keys().next().map(String::as_str), Some("A"));
    }

    #[test]
    fn grouped_table_keeps_latest_six_months() {
        let mut records = Vec::new();
        for month in 1..=9u32 {
            records.push(SalesRecord::new(d(2024, month, 5), 10.0, "A"));
            if month % 2 == 0 {
                records.push(SalesRecord::new(d(2024, month, 6), 4.0, "B"));
            }
        }
        // Only appears in a month that gets trimmed.
        records.push(SalesRecord::new(d(2024, 1, 9), 1.0, "Z"));

        let table = monthly_by_category(&records, 6);
        assert_eq!(table.periods.len(), 6);
        assert_eq!(table.periods.first(), Some(&d(2024, 4, 30)));
        assert_eq!(table.periods.last(), Some(&d(2024, 9, 30)));
        assert_eq!(table.categories, vec!["A".to_string(), "B".to_string(), "Z".to_string()]);
        // May has no "B" sales; "Z" only sold in trimmed January.
        assert_eq!(table.values[1], vec![10.0, 0.0, 0.0]);
        assert_eq!(table.values[2], vec![10.0, 4.0, 0.0]);
        assert!(table.values.iter().all(|row| row[2] == 0.0));
        assert_eq!(table.row_total(2), 14.0);
        assert_eq!(table.max_value(), 10.0);
        assert_eq!(table.min_value(), 0.0);
    }

    #[test]
    fn grouped_table_keeps_categories_from_trimmed_months() {
        let mut records: Vec<SalesRecord> = (1..=9u32)
            .map(|month| SalesRecord::new(d(2024, month, 15), 20.0, "A"))
            .collect();
        records.push(SalesRecord::new(d(2024, 1, 20), 3.0, "Z"));

        let table = monthly_by_category(&records, 6);
        assert_eq!(table.periods.len(), 6);
        assert_eq!(table.categories, vec!["A".to_string(), "Z".to_string()]);
        assert!(table.values.iter().all(|row| row == &vec![20.0, 0.0]));
    }

    #[test]
    fn grouped_table_skips_empty_months() {
        let records = vec![
            SalesRecord::new(d(2024, 1, 1), 1.0, "A"),
            SalesRecord::new(d(2024, 6, 1), 2.0, "A"),
        ];
        let table = monthly_by_category(&records, 6);
        assert_eq!(table.periods, vec![d(2024, 1, 31), d(2024, 6, 30)]);
    }

    #[test]
    fn empty_input_yields_empty_aggregations() {
        assert!(daily(&[]).is_empty());
        assert!(resample(&[], Granularity::Quarter).is_empty());
        assert!(monthly_by_category(&[], 6).is_empty());
    }
}
