//! Correlation heatmap with annotated cells and a colour bar.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{category_label, draw_err, draw_no_data, CategoryAxis, Theme, MISSING};
use crate::error::Result;
use crate::stats::CorrelationMatrix;

pub const HEATMAP_TITLE: &str = "Correlation Matrix of Daily Returns";

/// Stops of the diverging cool-warm map at -1, -0.5, 0, 0.5 and 1.
const COOLWARM: [(f64, (u8, u8, u8)); 5] = [
    (-1.0, (59, 76, 192)),
    (-0.5, (141, 176, 254)),
    (0.0, (221, 221, 221)),
    (0.5, (244, 154, 123)),
    (1.0, (180, 4, 38)),
];

/// Colour for a correlation value. Zero maps to the neutral middle stop.
pub fn coolwarm(value: f64) -> RGBColor {
    let v = value.clamp(-1.0, 1.0);
    for pair in COOLWARM.windows(2) {
        let (lo, c0) = pair[0];
        let (hi, c1) = pair[1];
        if v <= hi {
            let t = (v - lo) / (hi - lo);
            let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
            return RGBColor(mix(c0.0, c1.0), mix(c0.1, c1.1), mix(c0.2, c1.2));
        }
    }
    let (_, last) = COOLWARM[COOLWARM.len() - 1];
    RGBColor(last.0, last.1, last.2)
}

/// Text shown in a cell.
pub fn cell_label(value: Option<f64>) -> String {
    match value {
        Some(r) => format!("{:.2}", r),
        None => "n/a".to_string(),
    }
}

/// Row `i` is drawn at the top, so its centre on the y axis is counted from the end.
fn row_center(row: usize, n: usize) -> f64 {
    (n - 1 - row) as f64
}

pub fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    matrix: &CorrelationMatrix,
    theme: &Theme,
) -> Result<()> {
    let n = matrix.size();
    if n == 0 {
        return draw_no_data(area, HEATMAP_TITLE, theme);
    }

    let (w, _) = area.dim_in_pixel();
    let w = w as i32;
    let bar_width = theme.px(110.0).min(w / 4);
    let (grid_area, bar_area) = area.split_horizontally(w - bar_width);

    let tickers = matrix.tickers();
    let bottom_up: Vec<&str> = tickers.iter().rev().map(String::as_str).collect();

    let mut chart = ChartBuilder::on(&grid_area)
        .caption(HEATMAP_TITLE, theme.panel_title())
        .margin(theme.px(20.0))
        .x_label_area_size(theme.px(50.0))
        .y_label_area_size(theme.px(80.0))
        .build_cartesian_2d(CategoryAxis::new(n), CategoryAxis::new(n))
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&|x: &f64| category_label(tickers, *x))
        .y_label_formatter(&|y: &f64| category_label(&bottom_up, *y))
        .label_style(theme.tick_label())
        .draw()
        .map_err(draw_err)?;

    let mut cells = Vec::with_capacity(n * n);
    let mut labels = Vec::with_capacity(n * n);
    for row in 0..n {
        let y = row_center(row, n);
        for col in 0..n {
            let value = matrix.get(row, col);
            let x = col as f64;
            let fill = value.map(coolwarm).unwrap_or(MISSING);
            cells.push(Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                fill.filled(),
            ));

            let ink: &RGBColor = match value {
                Some(r) if r.abs() > 0.6 => &WHITE,
                _ => &BLACK,
            };
            let style = theme
                .annotation()
                .color(ink)
                .pos(Pos::new(HPos::Center, VPos::Center));
            labels.push(Text::new(cell_label(value), (x, y), style));
        }
    }
    chart.draw_series(cells).map_err(draw_err)?;
    chart.draw_series(labels).map_err(draw_err)?;

    draw_color_bar(&bar_area, theme)
}

/// Vertical colour scale from -1 to 1.
fn draw_color_bar<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, theme: &Theme) -> Result<()> {
    const STEPS: usize = 100;

    let mut bar = ChartBuilder::on(area)
        .margin_top(theme.px(70.0))
        .margin_bottom(theme.px(70.0))
        .margin_right(theme.px(10.0))
        .y_label_area_size(theme.px(60.0))
        .build_cartesian_2d(0.0..1.0, -1.0..1.0)
        .map_err(draw_err)?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&|v: &f64| format!("{:.1}", v))
        .label_style(theme.tick_label())
        .draw()
        .map_err(draw_err)?;

    let step = 2.0 / STEPS as f64;
    bar.draw_series((0..STEPS).map(|i| {
        let lo = -1.0 + i as f64 * step;
        let color = coolwarm(lo + step / 2.0);
        Rectangle::new([(0.0, lo), (1.0, lo + step)], color.filled())
    }))
    .map_err(draw_err)?;

    Ok(())
}
