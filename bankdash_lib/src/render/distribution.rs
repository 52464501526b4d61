//! Distribution panel: one box-and-whisker per ticker on a categorical axis.

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{
    category_label, draw_err, draw_no_data, padded_range, series_color, CategoryAxis, Theme, GRID,
};
use crate::error::Result;
use crate::stats::{box_stats, BoxStats};
use crate::table::PriceTable;

pub const DISTRIBUTION_TITLE: &str = "Distribution of Bank Stock Prices (5-Year)";

/// Half the box width, in category units.
const BOX_HALF_WIDTH: f64 = 0.3;
const CAP_HALF_WIDTH: f64 = 0.15;

/// Box statistics per ticker in table order. Tickers without data get `None`.
pub fn distribution_stats(prices: &PriceTable) -> Vec<(String, Option<BoxStats>)> {
    prices
        .iter()
        .map(|(ticker, series)| {
            let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
            (ticker.to_string(), box_stats(&closes))
        })
        .collect()
}

pub fn draw_distribution<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    prices: &PriceTable,
    theme: &Theme,
) -> Result<()> {
    let stats = distribution_stats(prices);
    let Some((lo, hi)) = stats
        .iter()
        .filter_map(|(_, s)| s.as_ref())
        .fold(None, |acc: Option<(f64, f64)>, s| match acc {
            Some((lo, hi)) => Some((lo.min(s.min), hi.max(s.max))),
            None => Some((s.min, s.max)),
        })
    else {
        return draw_no_data(area, DISTRIBUTION_TITLE, theme);
    };

    let (y_lo, y_hi) = padded_range(lo, hi);
    let names: Vec<&str> = stats.iter().map(|(t, _)| t.as_str()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(DISTRIBUTION_TITLE, theme.panel_title())
        .margin(theme.px(20.0))
        .x_label_area_size(theme.px(50.0))
        .y_label_area_size(theme.px(100.0))
        .build_cartesian_2d(CategoryAxis::new(names.len()), y_lo..y_hi)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Stock Price (USD)")
        .x_labels(names.len())
        .y_labels(8)
        .x_label_formatter(&|x: &f64| category_label(&names, *x))
        .light_line_style(TRANSPARENT)
        .bold_line_style(GRID.stroke_width(1))
        .label_style(theme.tick_label())
        .axis_desc_style(theme.axis_desc())
        .draw()
        .map_err(draw_err)?;

    let line = theme.stroke(2.0);
    for (i, (_, entry)) in stats.iter().enumerate() {
        let Some(s) = entry else {
            continue;
        };
        let x = i as f64;
        let color = series_color(i);

        chart
            .draw_series([
                Rectangle::new(
                    [(x - BOX_HALF_WIDTH, s.q1), (x + BOX_HALF_WIDTH, s.q3)],
                    color.mix(0.35).filled(),
                ),
                Rectangle::new(
                    [(x - BOX_HALF_WIDTH, s.q1), (x + BOX_HALF_WIDTH, s.q3)],
                    BLACK.stroke_width(line),
                ),
            ])
            .map_err(draw_err)?;

        let segments = [
            // whiskers
            vec![(x, s.q3), (x, s.upper_whisker)],
            vec![(x, s.q1), (x, s.lower_whisker)],
            // caps
            vec![(x - CAP_HALF_WIDTH, s.upper_whisker), (x + CAP_HALF_WIDTH, s.upper_whisker)],
            vec![(x - CAP_HALF_WIDTH, s.lower_whisker), (x + CAP_HALF_WIDTH, s.lower_whisker)],
        ];
        chart
            .draw_series(
                segments
                    .into_iter()
                    .map(|points| PathElement::new(points, BLACK.stroke_width(line))),
            )
            .map_err(draw_err)?;

        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x - BOX_HALF_WIDTH, s.median), (x + BOX_HALF_WIDTH, s.median)],
                color.stroke_width(theme.stroke(3.0)),
            )))
            .map_err(draw_err)?;

        chart
            .draw_series(
                s.outliers
                    .iter()
                    .map(|&v| Circle::new((x, v), theme.px(4.0), BLACK.stroke_width(1))),
            )
            .map_err(draw_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{PricePoint, TickerTable};
    use chrono::NaiveDate;

    #[test]
    fn test_distribution_stats_median() {
        let start = NaiveDate::from_ymd_opt(2014, 6, 2).unwrap();
        let series = [100.0, 102.0, 101.0, 105.0, 104.0]
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Days::new(i as u64),
                close,
            })
            .collect();
        let prices = TickerTable::new(vec![
            ("A".to_string(), series),
            ("B".to_string(), vec![]),
        ]);

        let stats = distribution_stats(&prices);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].0, "A");
        assert_eq!(stats[0].1.as_ref().unwrap().median, 102.0);
        assert!(stats[1].1.is_none());
    }

    #[test]
    fn test_draw_distribution_onto_buffer() {
        crate::render::ensure_fonts().unwrap();
        let start = NaiveDate::from_ymd_opt(2014, 6, 2).unwrap();
        let series = |closes: &[f64]| -> Vec<PricePoint> {
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PricePoint {
                    date: start + chrono::Days::new(i as u64),
                    close,
                })
                .collect()
        };
        let prices = TickerTable::new(vec![
            ("JPM".to_string(), series(&[100.0, 102.0, 101.0, 105.0, 104.0, 160.0])),
            ("C".to_string(), series(&[50.0])),
            ("WFC".to_string(), vec![]),
        ]);

        let (w, h) = (500u32, 400u32);
        let mut buffer = vec![0u8; (w * h * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            draw_distribution(&root, &prices, &Theme::for_figure(w, h)).unwrap();
            root.present().unwrap();
        }
        assert!(buffer.iter().any(|&b| b != 255));
    }
}
