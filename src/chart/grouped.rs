//! Grouped bar chart: one cluster per period, one bar per category.

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{ChartStyle, DrawableChart, format_amount, palette, value_range};
use crate::aggregate::CategoryTable;

/// Fraction of each period slot covered by its bar cluster.
const CLUSTER_WIDTH: f64 = 0.8;

pub struct GroupedBarChart<'a> {
    pub title: &'a str,
    pub table: &'a CategoryTable,
    /// One label per table row.
    pub row_labels: Vec<String>,
    pub size_in: (f64, f64),
}

impl<'a> GroupedBarChart<'a> {
    pub fn new(title: &'a str, table: &'a CategoryTable, row_labels: Vec<String>) -> Self {
        Self {
            title,
            table,
            row_labels,
            size_in: (12.0, 6.0),
        }
    }

    /// `[left, right)` x extent of the bar for `row` × `col`.
    ///
    /// Row `i` is centered on `x = i`.
    pub fn bar_extent(&self, row: usize, col: usize) -> (f64, f64) {
        let k = self.table.categories.len().max(1) as f64;
        let width = CLUSTER_WIDTH / k;
        let left = row as f64 - CLUSTER_WIDTH / 2.0 + col as f64 * width;
        (left, left + width)
    }
}

impl DrawableChart for GroupedBarChart<'_> {
    fn size_in(&self) -> (f64, f64) {
        self.size_in
    }

    fn skip_reason(&self) -> Option<String> {
        self.table
            .is_empty()
            .then(|| "not enough monthly data".to_string())
    }

    fn define_chart(
        &self,
        root: &DrawingArea<BitMapBackend, Shift>,
        style: &ChartStyle,
    ) -> Result<(), Box<dyn Error>> {
        let n = self.table.periods.len();
        let y_range = value_range([self.table.min_value(), self.table.max_value()].into_iter());
        let x_range = -0.5..(n as f64 - 0.5);

        let mut builder = ChartBuilder::on(root);
        builder
            .margin(style.px(0.15))
            .x_label_area_size(if style.text { style.px(1.0) } else { 0 })
            .y_label_area_size(if style.text { style.px(0.8) } else { 0 });
        if style.text {
            builder.caption(self.title, style.font(12.0));
        }
        let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

        let x_fmt = |v: &f64| {
            let r = v.round();
            if (v - r).abs() > 1e-6 || r < 0.0 {
                return String::new();
            }
            self.row_labels.get(r as usize).cloned().unwrap_or_default()
        };
        let y_fmt = |v: &f64| format_amount(*v);

        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .light_line_style(RGBColor(235, 235, 235))
            .x_labels(n)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt);
        if style.text {
            mesh.x_label_style(style.font(9.0).transform(FontTransform::Rotate90))
                .y_label_style(style.font(9.0))
                .x_desc("date")
                .y_desc("sales")
                .axis_desc_style(style.font(10.0));
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;

        let swatch = style.px(0.06) as i32;
        for (col, category) in self.table.categories.iter().enumerate() {
            let color = palette(col);
            let series = chart.draw_series((0..n).map(|row| {
                let (left, right) = self.bar_extent(row, col);
                let value = self.table.values[row][col];
                Rectangle::new([(left, 0.0), (right, value)], color.filled())
            }))?;
            series
                .label(category.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - swatch), (x + 2 * swatch, y + swatch)], color.filled()));
        }

        if style.text {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font(style.font(9.0))
                .draw()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::aggregate::monthly_by_category;
    use crate::chart::tests::{assert_png, test_renderer};
    use crate::domain::{ChartOutcome, Granularity, SalesRecord};

    fn table() -> CategoryTable {
        let d = |m: u32| NaiveDate::from_ymd_opt(2024, m, 10).unwrap();
        let records = vec![
            SalesRecord::new(d(1), 10.0, "A"),
            SalesRecord::new(d(1), 5.0, "B"),
            SalesRecord::new(d(2), 7.0, "A"),
            SalesRecord::new(d(3), 3.0, "C"),
        ];
        monthly_by_category(&records, 6)
    }

    fn labels(table: &CategoryTable) -> Vec<String> {
        table.periods.iter().map(|p| Granularity::Month.label(*p)).collect()
    }

    #[test]
    fn bars_stay_inside_their_cluster() {
        let table = table();
        let chart = GroupedBarChart::new("Grouped", &table, labels(&table));
        let k = table.categories.len();

        let (first_left, _) = chart.bar_extent(1, 0);
        let (_, last_right) = chart.bar_extent(1, k - 1);
        assert!((first_left - 0.6).abs() < 1e-12);
        assert!((last_right - 1.4).abs() < 1e-12);

        let (_, a_right) = chart.bar_extent(0, 0);
        let (b_left, _) = chart.bar_extent(0, 1);
        assert!((a_right - b_left).abs() < 1e-12);
    }

    #[test]
    fn renders_grouped_bars() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = test_renderer(dir.path());
        let table = table();
        let chart = GroupedBarChart::new("Monthly by Category", &table, labels(&table));
        assert_png(&renderer.render("monthly_by_category_grouped", &chart).unwrap());
    }

    #[test]
    fn empty_table_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = test_renderer(dir.path());
        let table = monthly_by_category(&[], 6);
        let outcome = renderer
            .render("grouped", &GroupedBarChart::new("Grouped", &table, Vec::new()))
            .unwrap();
        assert_eq!(
            outcome,
            ChartOutcome::Skipped {
                chart: "grouped".to_string(),
                reason: "not enough monthly data".to_string(),
            }
        );
    }
}
