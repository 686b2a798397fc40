//! Font discovery for chart text.
//!
//! Plotters' `ab_glyph` backend draws text from fonts registered at runtime.
//! We look for a TTF file in this order:
//!
//! 1. an explicit path (`--font`)
//! 2. `SALES_CHARTS_FONT` (environment or `.env`)
//! 3. a few well-known system locations
//!
//! If nothing loads, charts are drawn without text instead of failing.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{FontStyle, register_font};
use tracing::{debug, info, warn};

/// Family name every chart asks for.
pub const FAMILY: &str = "sans-serif";

/// Environment variable naming a TTF file.
pub const FONT_ENV: &str = "SALES_CHARTS_FONT";

const SYSTEM_FONTS: [&str; 8] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static TEXT_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Register a font once per process and report whether text can be drawn.
///
/// Only the first call's `explicit` path is considered.
pub fn ensure_fonts(explicit: Option<&Path>) -> bool {
    *TEXT_AVAILABLE.get_or_init(|| register_first_available(explicit))
}

fn register_first_available(explicit: Option<&Path>) -> bool {
    for path in candidate_paths(explicit) {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "font not readable");
                continue;
            }
        };

        // ab_glyph keeps a reference to the font data for the process lifetime.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                info!(path = %path.display(), "registered chart font");
                return true;
            }
            Err(_) => warn!(path = %path.display(), "not a usable TTF font"),
        }
    }

    warn!("no usable TTF font found; charts will be rendered without text (set {FONT_ENV} or --font)");
    false
}

fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = explicit.map(Path::to_path_buf).into_iter().collect();
    if let Some(env) = std::env::var_os(FONT_ENV).filter(|v| !v.is_empty()) {
        paths.push(PathBuf::from(env));
    }
    paths.extend(SYSTEM_FONTS.iter().map(PathBuf::from));
    paths
}
