//! Categorical bar chart.

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{ChartStyle, DrawableChart, format_amount, label_step, palette, value_range};

const MAX_X_LABELS: usize = 40;

/// One bar per `(label, value)`, in the given order.
pub struct BarChart<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub bars: &'a [(String, f64)],
    pub size_in: (f64, f64),
}

impl<'a> BarChart<'a> {
    pub fn new(title: &'a str, bars: &'a [(String, f64)]) -> Self {
        Self {
            title,
            x_desc: "category",
            y_desc: "sales",
            bars,
            size_in: (8.0, 5.0),
        }
    }
}

impl DrawableChart for BarChart<'_> {
    fn size_in(&self) -> (f64, f64) {
        self.size_in
    }

    fn skip_reason(&self) -> Option<String> {
        self.bars.is_empty().then(|| "no category totals".to_string())
    }

    fn define_chart(
        &self,
        root: &DrawingArea<BitMapBackend, Shift>,
        style: &ChartStyle,
    ) -> Result<(), Box<dyn Error>> {
        let n = self.bars.len();
        let y_range = value_range(self.bars.iter().map(|(_, v)| *v));

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
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) if (*i as usize) % step == 0 => self
                .bars
                .get(*i as usize)
                .map(|(label, _)| label.clone())
                .unwrap_or_default(),
            _ => String::new(),
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
                .x_desc(self.x_desc)
                .y_desc(self.y_desc)
                .axis_desc_style(style.font(10.0));
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;

        let gap = style.px(0.08);
        let color = palette(0);
        chart.draw_series(self.bars.iter().enumerate().map(|(i, (_, v))| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                color.filled(),
            );
            bar.set_margin(0, 0, gap, gap);
            bar
        }))?;

        Ok(())
    }
}
