//! Share-of-total pie chart.
//!
//! Wedges are drawn as polygons directly on the pixel canvas. They start at
//! 140° and run counter-clockwise in input order, each labeled with its
//! category and annotated with its percentage.

use std::error::Error;
use std::f64::consts::PI;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{ChartStyle, DrawableChart, palette};

const START_ANGLE_DEG: f64 = 140.0;

pub struct PieChart<'a> {
    pub title: &'a str,
    pub slices: &'a [(String, f64)],
    pub size_in: (f64, f64),
}

impl<'a> PieChart<'a> {
    pub fn new(title: &'a str, slices: &'a [(String, f64)]) -> Self {
        Self {
            title,
            slices,
            size_in: (6.0, 6.0),
        }
    }

    fn total(&self) -> f64 {
        self.slices.iter().map(|(_, v)| *v).sum()
    }

    /// `(label, start, sweep)` angles in radians, one per slice.
    pub fn wedges(&self) -> Vec<(&str, f64, f64)> {
        let total = self.total();
        let mut angle = START_ANGLE_DEG.to_radians();
        self.slices
            .iter()
            .map(|(label, v)| {
                let sweep = 2.0 * PI * v / total;
                let wedge = (label.as_str(), angle, sweep);
                angle += sweep;
                wedge
            })
            .collect()
    }
}

/// Format a share the way `%1.1f%%` does.
pub fn format_percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

impl DrawableChart for PieChart<'_> {
    fn size_in(&self) -> (f64, f64) {
        self.size_in
    }

    fn skip_reason(&self) -> Option<String> {
        if self.slices.is_empty() {
            return Some("no category totals".to_string());
        }
        let total = self.total();
        if !(total.is_finite() && total > 0.0) {
            return Some(format!("category totals sum to {total}"));
        }
        None
    }

    fn define_chart(
        &self,
        root: &DrawingArea<BitMapBackend, Shift>,
        style: &ChartStyle,
    ) -> Result<(), Box<dyn Error>> {
        if let Some((label, v)) = self.slices.iter().find(|(_, v)| *v < 0.0) {
            return Err(format!("wedge sizes must be non-negative ('{label}' is {v})").into());
        }

        let area = if style.text {
            root.titled(self.title, style.font(12.0))?
        } else {
            root.clone()
        };

        let (w, h) = area.dim_in_pixel();
        let cx = f64::from(w) / 2.0;
        let cy = f64::from(h) / 2.0;
        let radius = f64::from(w.min(h)) * 0.36;
        let to_px = |angle: f64, r: f64| {
            // Screen y grows downward, so counter-clockwise means subtracting sin.
            ((cx + r * angle.cos()).round() as i32, (cy - r * angle.sin()).round() as i32)
        };

        let total = self.total();
        for (i, (_, start, sweep)) in self.wedges().into_iter().enumerate() {
            let steps = ((sweep.to_degrees()).ceil() as usize).max(2);
            let mut points = Vec::with_capacity(steps + 2);
            points.push(to_px(0.0, 0.0));
            for s in 0..=steps {
                points.push(to_px(start + sweep * s as f64 / steps as f64, radius));
            }
            area.draw(&Polygon::new(points, palette(i).filled()))?;
        }

        if !style.text {
            return Ok(());
        }

        let label_font = style.font(10.0);
        for ((label, start, sweep), (_, v)) in self.wedges().into_iter().zip(self.slices) {
            let mid = start + sweep / 2.0;
            let h_pos = if mid.cos() >= 0.0 { HPos::Left } else { HPos::Right };

            let label_style = TextStyle::from(label_font.clone()).pos(Pos::new(h_pos, VPos::Center));
            area.draw(&Text::new(label.to_string(), to_px(mid, radius * 1.1), label_style))?;

            let pct_style = TextStyle::from(label_font.clone()).pos(Pos::new(HPos::Center, VPos::Center));
            area.draw(&Text::new(format_percent(v / total), to_px(mid, radius * 0.6), pct_style))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::tests::{assert_png, test_renderer};
    use crate::domain::ChartOutcome;
    use crate::error::ErrorKind;

    fn slices(values: &[(&str, f64)]) -> Vec<(String, f64)> {
        values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn wedges_follow_input_order_and_cover_circle() {
        let data = slices(&[("B", 70.0), ("A", 30.0)]);
        let chart = PieChart::new("Share", &data);
        let wedges = chart.wedges();

        assert_eq!(wedges[0].0, "B");
        assert!((wedges[0].1 - 140f64.to_radians()).abs() < 1e-12);
        assert!((wedges[0].2 - 0.7 * 2.0 * PI).abs() < 1e-12);
        assert!((wedges[1].1 - (wedges[0].1 + wedges[0].2)).abs() < 1e-12);

        let swept: f64 = wedges.iter().map(|w| w.2).sum();
        assert!((swept - 2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn percent_matches_one_decimal() {
        assert_eq!(format_percent(0.7), "70.0%");
        assert_eq!(format_percent(1.0 / 3.0), "33.3%");
    }

    #[test]
    fn renders_pie() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = test_renderer(dir.path());
        let data = slices(&[("B", 70.0), ("A", 30.0), ("C", 0.0)]);
        assert_png(&renderer.render("category_share_pie", &PieChart::new("Share", &data)).unwrap());
    }

    #[test]
    fn empty_or_zero_pie_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = test_renderer(dir.path());

        let outcome = renderer.render("pie", &PieChart::new("Share", &[])).unwrap();
        assert!(matches!(outcome, ChartOutcome::Skipped { ref reason, .. } if reason == "no category totals"));

        let zeros = slices(&[("A", 0.0)]);
        let outcome = renderer.render("pie", &PieChart::new("Share", &zeros)).unwrap();
        assert!(matches!(outcome, ChartOutcome::Skipped { .. }));
    }

    #[test]
    fn negative_wedge_fails() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = test_renderer(dir.path());
        let data = slices(&[("A", 50.0), ("B", -10.0)]);
        let err = renderer.render("pie", &PieChart::new("Share", &data)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenderFailure);
        assert!(err.message().contains("non-negative"));
    }
}
