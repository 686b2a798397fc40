//! Time-series line chart.

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{ChartStyle, DrawableChart, format_amount, label_step, palette, value_range};

const MAX_X_LABELS: usize = 24;

/// Point marker drawn on top of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
}

/// Ordered `(label, value)` points joined by a line.
pub struct LineChart<'a> {
    pub title: &'a str,
    pub x_desc: Option<&'a str>,
    pub y_desc: Option<&'a str>,
    pub points: &'a [(String, f64)],
    pub marker: Option<Marker>,
    pub size_in: (f64, f64),
}

impl<'a> LineChart<'a> {
    pub fn new(title: &'a str, points: &'a [(String, f64)]) -> Self {
        Self {
            title,
            x_desc: None,
            y_desc: None,
            points,
            marker: None,
            size_in: (10.0, 4.0),
        }
    }

    pub fn axes(mut self, x_desc: &'a str, y_desc: &'a str) -> Self {
        self.x_desc = Some(x_desc);
        self.y_desc = Some(y_desc);
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size_in = (width, height);
        self
    }
}

impl DrawableChart for LineChart<'_> {
    fn size_in(&self) -> (f64, f64) {
        self.size_in
    }

    fn define_chart(
        &self,
        root: &DrawingArea<BitMapBackend, Shift>,
        style: &ChartStyle,
    ) -> Result<(), Box<dyn Error>> {
        let n = self.points.len();
        if n == 0 {
            return Err("line chart has no points".into());
        }

        let y_range = value_range(self.points.iter().map(|(_, v)| *v));

        let mut builder = ChartBuilder::on(root);
        builder
            .margin(style.px(0.15))
            .x_label_area_size(if style.text { style.px(1.0) } else { 0 })
            .y_label_area_size(if style.text { style.px(0.8) } else { 0 });
        if style.text {
            builder.caption(self.title, style.font(12.0));
        }
        let mut chart = builder.build_cartesian_2d((0..n as i32).into_segmented(), y_range)?;

        let step = label_step(n, MAX_X_LABELS);
        let x_fmt = |v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                let i = *i as usize;
                if i % step == 0 {
                    self.points.get(i).map(|(label, _)| label.clone()).unwrap_or_default()
                } else {
                    String::new()
                }
            }
            SegmentValue::Last => String::new(),
        };
        let y_fmt = |v: &f64| format_amount(*v);

        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .light_line_style(RGBColor(235, 235, 235))
            .x_labels(n)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt);
        if style.text {
            mesh.x_label_style(style.font(8.0).transform(FontTransform::Rotate90))
                .y_label_style(style.font(8.0));
            if let Some(desc) = self.x_desc {
                mesh.x_desc(desc);
            }
            if let Some(desc) = self.y_desc {
                mesh.y_desc(desc);
            }
            mesh.axis_desc_style(style.font(10.0));
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;

        let color = palette(0);
        let stroke = (style.pt(1.5).round() as u32).max(1);
        let at = |i: usize| SegmentValue::CenterOf(i as i32);

        chart.draw_series(LineSeries::new(
            self.points.iter().enumerate().map(|(i, (_, v))| (at(i), *v)),
            color.stroke_width(stroke),
        ))?;

        let r = (style.pt(3.0).round() as i32).max(1);
        match self.marker {
            Some(Marker::Circle) => {
                chart.draw_series(
                    self.points
                        .iter()
                        .enumerate()
                        .map(|(i, (_, v))| Circle::new((at(i), *v), r, color.filled())),
                )?;
            }
            Some(Marker::Square) => {
                chart.draw_series(self.points.iter().enumerate().map(|(i, (_, v))| {
                    EmptyElement::at((at(i), *v)) + Rectangle::new([(-r, -r), (r, r)], color.filled())
                }))?;
            }
            None => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::tests::{assert_png, test_renderer};

    fn points(n: usize) -> Vec<(String, f64)> {
        (0..n).map(|i| (format!("2024-01-{:02}", i + 1), (i * 7 % 11) as f64)).collect()
    }

    #[test]
    fn renders_line_with_markers() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = test_renderer(dir.path());
        let data = points(12);

        let plain = LineChart::new("Daily Sales", &data).axes("date", "sales");
        assert_png(&renderer.render("daily", &plain).unwrap());

        let squares = LineChart::new("Quarterly Sales", &data).marker(Marker::Square).size(9.0, 4.0);
        assert_png(&renderer.render("quarterly", &squares).unwrap());

        let circles = LineChart::new("Monthly Sales", &data).marker(Marker::Circle);
        assert_png(&renderer.render("monthly", &circles).unwrap());
    }

    #[test]
    fn single_point_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = test_renderer(dir.path());
        let data = vec![("2024-01".to_string(), 0.0)];
        assert_png(&renderer.render("one", &LineChart::new("One", &data)).unwrap());
    }

    #[test]
    fn empty_series_is_a_render_failure() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = test_renderer(dir.path());
        let err = renderer.render("empty", &LineChart::new("Empty", &[])).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::RenderFailure);
    }
}
