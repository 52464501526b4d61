//! Trend and volatility panels: one line per ticker over a shared time axis.

use std::ops::Range;

use chrono::{Days, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{draw_err, draw_no_data, padded_range, series_color, Theme, GRID};
use crate::error::Result;
use crate::table::{Dated, PriceTable, ReturnTable, TickerTable};

pub const TREND_TITLE: &str = "Bank Stock Price Performance (5-Year)";
pub const VOLATILITY_TITLE: &str = "Daily Returns (Volatility)";

/// Axis text and line treatment for one time-series panel.
struct LinePanel<'a> {
    title: &'a str,
    y_desc: &'a str,
    opacity: f64,
    stroke: f64,
}

/// Spans shorter than this get day-level tick labels so month labels do not repeat.
const SHORT_SPAN_DAYS: i64 = 365;

fn date_label_format(first: NaiveDate, last: NaiveDate) -> &'static str {
    if (last - first).num_days() < SHORT_SPAN_DAYS {
        "%Y-%m-%d"
    } else {
        "%Y-%m"
    }
}

/// The x range runs at least one day so a single date still spans the axis.
fn date_axis(first: NaiveDate, last: NaiveDate) -> Range<NaiveDate> {
    let min_end = first.checked_add_days(Days::new(1)).unwrap_or(first);
    first..last.max(min_end)
}

fn draw_lines<DB, P>(
    area: &DrawingArea<DB, Shift>,
    table: &TickerTable<P>,
    panel: &LinePanel<'_>,
    theme: &Theme,
) -> Result<()>
where
    DB: DrawingBackend,
    P: Dated,
{
    let (Some((first, last)), Some((lo, hi))) = (table.date_span(), table.value_range()) else {
        return draw_no_data(area, panel.title, theme);
    };

    let (y_lo, y_hi) = padded_range(lo, hi);
    let label_format = date_label_format(first, last);

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, theme.panel_title())
        .margin(theme.px(20.0))
        .x_label_area_size(theme.px(70.0))
        .y_label_area_size(theme.px(100.0))
        .build_cartesian_2d(date_axis(first, last), y_lo..y_hi)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(panel.y_desc)
        .x_labels(8)
        .y_labels(8)
        .x_label_formatter(&|d: &NaiveDate| d.format(label_format).to_string())
        .light_line_style(TRANSPARENT)
        .bold_line_style(GRID.stroke_width(1))
        .label_style(theme.tick_label())
        .axis_desc_style(theme.axis_desc())
        .draw()
        .map_err(draw_err)?;

    let stroke = theme.stroke(panel.stroke);
    for (i, (ticker, series)) in table.iter().enumerate() {
        let color = series_color(i).mix(panel.opacity);
        let points = series
            .iter()
            .filter(|p| p.value().is_finite())
            .map(|p| (p.date(), p.value()));

        chart
            .draw_series(LineSeries::new(points, color.stroke_width(stroke)))
            .map_err(draw_err)?
            .label(ticker)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(3))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK.mix(0.3))
        .label_font(theme.tick_label())
        .draw()
        .map_err(draw_err)?;

    Ok(())
}

/// Closing price against date, one line per ticker.
pub fn draw_trend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    prices: &PriceTable,
    theme: &Theme,
) -> Result<()> {
    let panel = LinePanel {
        title: TREND_TITLE,
        y_desc: "Stock Price (USD)",
        opacity: 1.0,
        stroke: 2.0,
    };
    draw_lines(area, prices, &panel, theme)
}

/// Daily return against date, one line per ticker.
pub fn draw_volatility<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    returns: &ReturnTable,
    theme: &Theme,
) -> Result<()> {
    let panel = LinePanel {
        title: VOLATILITY_TITLE,
        y_desc: "Percentage Change",
        opacity: 0.8,
        stroke: 1.0,
    };
    draw_lines(area, returns, &panel, theme)
}
