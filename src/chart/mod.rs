//! PNG chart rendering with Plotters.
//!
//! Each chart type is a small, data-driven struct implementing
//! [`DrawableChart`]. All series and labels are computed before drawing; the
//! draw call only owns the bitmap for its own duration, so nothing from one
//! chart's drawing context survives into the next.

use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{error, info};

use crate::domain::ChartOutcome;
use crate::error::AppError;

pub mod bar;
pub mod fonts;
pub mod grouped;
pub mod line;
pub mod pie;

pub use bar::BarChart;
pub use grouped::GroupedBarChart;
pub use line::{LineChart, Marker};
pub use pie::PieChart;

/// The "tab10" color cycle.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub fn palette(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

/// Resolution and typography shared by every chart of a run.
#[derive(Debug, Clone, Copy)]
pub struct ChartStyle {
    pub dpi: u32,
    /// Whether a font is registered; without one, charts are drawn text-free.
    pub text: bool,
}

impl ChartStyle {
    /// Convert inches to pixels.
    pub fn px(&self, inches: f64) -> u32 {
        (inches * f64::from(self.dpi)).round().max(1.0) as u32
    }

    /// Convert typographic points to pixels.
    pub fn pt(&self, points: f64) -> f64 {
        points * f64::from(self.dpi) / 72.0
    }

    pub fn font(&self, points: f64) -> FontDesc<'static> {
        (fonts::FAMILY, self.pt(points)).into_font()
    }
}

/// A chart that can be drawn onto a bitmap.
pub trait DrawableChart {
    /// Figure size in inches (width, height).
    fn size_in(&self) -> (f64, f64);

    /// Why this chart should not be drawn at all, if anything.
    fn skip_reason(&self) -> Option<String> {
        None
    }

    fn define_chart(
        &self,
        root: &DrawingArea<BitMapBackend, Shift>,
        style: &ChartStyle,
    ) -> Result<(), Box<dyn Error>>;

    fn draw(&self, path: &Path, style: &ChartStyle) -> Result<(), Box<dyn Error>> {
        let (w, h) = self.size_in();
        let root = BitMapBackend::new(path, (style.px(w), style.px(h))).into_drawing_area();
        root.fill(&WHITE)?;
        self.define_chart(&root, style)?;
        root.present()?;
        Ok(())
    }
}

/// Writes charts into one output directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    out_dir: PathBuf,
    style: ChartStyle,
}

impl ChartRenderer {
    pub fn new(out_dir: impl Into<PathBuf>, style: ChartStyle) -> Self {
        Self {
            out_dir: out_dir.into(),
            style,
        }
    }

    /// Render `chart` to `<out_dir>/<name>.png`.
    ///
    /// Returns `Skipped` when the chart declines to draw; plotters errors
    /// become `RenderFailure`.
    pub fn render(&self, name: &str, chart: &dyn DrawableChart) -> Result<ChartOutcome, AppError> {
        if let Some(reason) = chart.skip_reason() {
            return Ok(ChartOutcome::Skipped {
                chart: name.to_string(),
                reason,
            });
        }

        let path = self.out_dir.join(format!("{name}.png"));
        chart.draw(&path, &self.style).map_err(|e| {
            error!(chart = name, error = %e, "chart rendering failed");
            AppError::render(&path, e)
        })?;
        info!(path = %path.display(), "saved chart");

        Ok(ChartOutcome::Saved {
            chart: name.to_string(),
            path,
        })
    }
}

/// Y range that always includes zero, padded at the open end(s).
pub(crate) fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = if hi - lo > 1e-12 { hi - lo } else { 1.0 };
    let pad = span * 0.05;
    let lo = if lo < 0.0 { lo - pad } else { lo };
    (lo)..(hi + pad)
}

/// Show every `step`-th x label so at most `max_labels` are printed.
pub(crate) fn label_step(n: usize, max_labels: usize) -> usize {
    n.div_ceil(max_labels.max(1)).max(1)
}

/// Compact tick label for amounts.
pub(crate) fn format_amount(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if abs >= 1e4 {
        format!("{:.0}k", v / 1e3)
    } else if abs >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}
