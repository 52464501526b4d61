//! Chart rendering for the dashboard.
//!
//! Each panel is drawn by its own function onto a plotters drawing area and
//! depends only on the tables it is given. [`compose`] arranges the panels in
//! a 2x2 grid and encodes the result as PNG.

pub mod compose;
pub mod distribution;
pub mod heatmap;
pub mod timeseries;

use std::ops::Range;
use std::sync::OnceLock;

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::register_font;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::{DashboardError, Result};

pub use compose::{draw_dashboard, export_png, render_rgb, DashboardData};

const FONT_REGULAR: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
const FONT_BOLD: &[u8] = include_bytes!("../../assets/DejaVuSans-Bold.ttf");
const FONT_FAMILY: &str = "sans-serif";

/// Ten-colour categorical cycle (matplotlib "tab10").
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

pub const GRID: RGBColor = RGBColor(225, 225, 225);
pub const MISSING: RGBColor = RGBColor(200, 200, 200);

/// Colour for the `index`-th ticker.
pub fn series_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

static FONTS: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Register the embedded fonts with plotters once per process.
pub(crate) fn ensure_fonts() -> Result<()> {
    FONTS
        .get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, FONT_REGULAR)
                .map_err(|_| "embedded regular font is invalid".to_string())?;
            register_font(FONT_FAMILY, FontStyle::Bold, FONT_BOLD)
                .map_err(|_| "embedded bold font is invalid".to_string())?;
            Ok(())
        })
        .clone()
        .map_err(DashboardError::Font)
}

pub(crate) fn draw_err<E>(e: DrawingAreaErrorKind<E>) -> DashboardError
where
    E: std::error::Error + Send + Sync,
{
    DashboardError::Render(e.to_string())
}

/// Sizes scaled to the figure so that small and large renders look alike.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    scale: f64,
}

impl Theme {
    /// Reference figure is 2000x1500.
    pub fn for_figure(width: u32, height: u32) -> Self {
        let scale = (width as f64 / 2000.0).min(height as f64 / 1500.0).max(0.2);
        Self { scale }
    }

    /// Layout length in pixels, for margins and label areas.
    pub fn px(&self, base: f64) -> i32 {
        (base * self.scale).round().max(1.0) as i32
    }

    /// Line width in pixels.
    pub fn stroke(&self, base: f64) -> u32 {
        (base * self.scale).round().max(1.0) as u32
    }

    fn font(&self, size: f64, style: FontStyle) -> TextStyle<'static> {
        FontDesc::new(FontFamily::SansSerif, size * self.scale, style).color(&BLACK)
    }

    pub fn figure_title(&self) -> TextStyle<'static> {
        self.font(40.0, FontStyle::Bold)
    }

    pub fn panel_title(&self) -> TextStyle<'static> {
        self.font(26.0, FontStyle::Normal)
    }

    pub fn axis_desc(&self) -> TextStyle<'static> {
        self.font(19.0, FontStyle::Normal)
    }

    pub fn tick_label(&self) -> TextStyle<'static> {
        self.font(15.0, FontStyle::Normal)
    }

    pub fn annotation(&self) -> TextStyle<'static> {
        self.font(18.0, FontStyle::Normal)
    }
}

/// Categorical axis with `count` slots. Slot `i` is centred on `i as f64` and
/// spans half a unit either side, so boxes and cells can be placed at
/// fractional offsets. Ticks fall only on slot centres.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CategoryAxis {
    count: usize,
}

impl CategoryAxis {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            count: count.max(1),
        }
    }
}

impl Ranged for CategoryAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let Range { start, end } = self.range();
        let t = (value - start) / (end - start);
        limit.0 + (t * f64::from(limit.1 - limit.0)).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        let max = hint.max_num_points();
        if max == 0 {
            return Vec::new();
        }
        let step = self.count.div_ceil(max);
        (0..self.count).step_by(step).map(|i| i as f64).collect()
    }

    fn range(&self) -> Range<f64> {
        -0.5..self.count as f64 - 0.5
    }
}

/// Name of the slot a tick sits on, or an empty label between slots.
pub(crate) fn category_label<S: AsRef<str>>(names: &[S], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names
        .get(idx as usize)
        .map(|n| n.as_ref().to_string())
        .unwrap_or_default()
}

/// Pad a value range so that flat or single-point data still spans the axis.
pub(crate) fn padded_range(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span.abs() < f64::EPSILON * lo.abs().max(1.0) {
        let pad = (lo.abs() * 0.05).max(1e-3);
        (lo - pad, hi + pad)
    } else {
        let pad = span * 0.05;
        (lo - pad, hi + pad)
    }
}

/// Title and a centred notice for a panel without any data to plot.
pub(crate) fn draw_no_data<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    theme: &Theme,
) -> Result<()> {
    let body = area.titled(title, theme.panel_title()).map_err(draw_err)?;
    let (w, h) = body.dim_in_pixel();
    let style = theme
        .axis_desc()
        .color(&MISSING)
        .pos(Pos::new(HPos::Center, VPos::Center));
    body.draw(&Text::new("No data", ((w / 2) as i32, (h / 2) as i32), style))
        .map_err(draw_err)?;
    Ok(())
}
