//! Figure layout and PNG export.

use std::path::Path;

use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use super::distribution::draw_distribution;
use super::heatmap::draw_heatmap;
use super::timeseries::{draw_trend, draw_volatility};
use super::{draw_err, ensure_fonts, Theme};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::stats::CorrelationMatrix;
use crate::table::{PriceTable, ReturnTable};

const TITLE_TOP_MARGIN: f64 = 24.0;

/// Everything the four panels are drawn from.
#[derive(Debug, Clone, Copy)]
pub struct DashboardData<'a> {
    pub prices: &'a PriceTable,
    pub returns: &'a ReturnTable,
    pub correlation: &'a CorrelationMatrix,
}

/// Draw the titled 2x2 dashboard onto `root`.
///
/// Panel order is distribution, trend, volatility, heatmap, filled row by row.
pub fn draw_dashboard<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &DashboardData<'_>,
    title: &str,
) -> Result<()> {
    ensure_fonts()?;

    let (w, h) = root.dim_in_pixel();
    let theme = Theme::for_figure(w, h);

    root.fill(&WHITE).map_err(draw_err)?;
    // Glyphs rise above the anchor `titled` places them at
    let body = root
        .margin(theme.px(TITLE_TOP_MARGIN), 0, 0, 0)
        .titled(title, theme.figure_title())
        .map_err(draw_err)?;
    let panels = body.split_evenly((2, 2));

    draw_distribution(&panels[0], data.prices, &theme)?;
    draw_trend(&panels[1], data.prices, &theme)?;
    draw_volatility(&panels[2], data.returns, &theme)?;
    draw_heatmap(&panels[3], data.correlation, &theme)?;

    Ok(())
}

/// Render the dashboard into a packed RGB buffer of `width * height * 3` bytes.
///
/// The figure size is checked before the buffer is allocated.
pub fn render_rgb(data: &DashboardData<'_>, config: &DashboardConfig) -> Result<Vec<u8>> {
    config.figure_size.validate()?;
    let (width, height) = config.figure_size.as_tuple();
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_dashboard(&root, data, &config.title)?;
        root.present().map_err(draw_err)?;
    }
    Ok(buffer)
}

/// Render the dashboard and write it to `path` as PNG.
///
/// The parent directory must already exist. Nothing is written if drawing fails.
pub fn export_png(path: &Path, data: &DashboardData<'_>, config: &DashboardConfig) -> Result<()> {
    let export_err = |reason: String| DashboardError::Export {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(export_err(format!(
                "directory '{}' does not exist",
                parent.display()
            )));
        }
    }

    let (width, height) = config.figure_size.as_tuple();
    let buffer = render_rgb(data, config)?;
    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| export_err("rendered buffer does not match figure size".to_string()))?;

    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| export_err(e.to_string()))?;

    debug!("Wrote {}x{} PNG to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FigureSize;
    use crate::returns::daily_returns;
    use crate::stats::correlation_matrix;
    use crate::table::{PricePoint, TickerTable};
    use chrono::NaiveDate;

    fn small_config() -> DashboardConfig {
        DashboardConfig {
            figure_size: FigureSize {
                width: 600,
                height: 450,
            },
            ..DashboardConfig::default()
        }
    }

    fn sample_prices() -> PriceTable {
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
        TickerTable::new(vec![
            ("JPM".to_string(), series(&[100.0, 102.0, 101.0, 105.0, 104.0])),
            ("BAC".to_string(), series(&[15.0, 15.3, 15.1, 15.6, 15.4])),
            ("GS".to_string(), vec![]),
        ])
    }

    #[test]
    fn test_render_is_deterministic() {
        let config = small_config();
        let prices = sample_prices();
        let returns = daily_returns(&prices);
        let correlation = correlation_matrix(&returns);
        let data = DashboardData {
            prices: &prices,
            returns: &returns,
            correlation: &correlation,
        };

        let first = render_rgb(&data, &config).unwrap();
        let second = render_rgb(&data, &config).unwrap();
        assert_eq!(first.len(), 600 * 450 * 3);
        assert!(first == second);
        // Something other than the white background was drawn
        assert!(first.iter().any(|&b| b != 255));
    }

    #[test]
    fn test_render_empty_tables() {
        let config = small_config();
        let prices: PriceTable = TickerTable::new(vec![]);
        let returns = daily_returns(&prices);
        let correlation = correlation_matrix(&returns);
        let data = DashboardData {
            prices: &prices,
            returns: &returns,
            correlation: &correlation,
        };

        let buffer = render_rgb(&data, &config).unwrap();
        assert_eq!(buffer.len(), 600 * 450 * 3);
    }

    #[test]
    fn test_title_clears_top_edge() {
        let config = DashboardConfig {
            figure_size: FigureSize {
                width: 800,
                height: 600,
            },
            title: "Major US Bank Stocks (JPM, BAC, C, WFC, GS)".to_string(),
            ..DashboardConfig::default()
        };
        let prices = sample_prices();
        let returns = daily_returns(&prices);
        let correlation = correlation_matrix(&returns);
        let data = DashboardData {
            prices: &prices,
            returns: &returns,
            correlation: &correlation,
        };

        let buffer = render_rgb(&data, &config).unwrap();
        let row = 800 * 3;
        assert!(buffer[..4 * row].iter().all(|&b| b == 255));
        // The title itself is still drawn near the top
        assert!(buffer[4 * row..40 * row].iter().any(|&b| b != 255));
    }

    #[test]
    fn test_render_rejects_oversized_figure() {
        let config = DashboardConfig {
            figure_size: FigureSize {
                width: 100_000,
                height: 100_000,
            },
            ..DashboardConfig::default()
        };
        let prices = sample_prices();
        let returns = daily_returns(&prices);
        let correlation = correlation_matrix(&returns);
        let data = DashboardData {
            prices: &prices,
            returns: &returns,
            correlation: &correlation,
        };

        let err = render_rgb(&data, &config).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidConfig(_)));
    }

    #[test]
    fn test_export_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let config = small_config();
        let prices = sample_prices();
        let returns = daily_returns(&prices);
        let correlation = correlation_matrix(&returns);
        let data = DashboardData {
            prices: &prices,
            returns: &returns,
            correlation: &correlation,
        };

        let err = export_png(&path, &data, &config).unwrap_err();
        assert!(matches!(err, DashboardError::Export { .. }));
        assert!(!path.exists());
    }
}
