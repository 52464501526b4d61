//! Dashboard configuration.
//!
//! Everything the pipeline needs to know is carried by [`DashboardConfig`]:
//! where to read, where to write, which tickers to include, and how large
//! the figure is. A YAML file may override any subset of the defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DashboardError, Result};

pub const DEFAULT_INPUT: &str = "all_stocks_5yr.csv";
pub const DEFAULT_OUTPUT: &str = "bank_data_visualization.png";
pub const DEFAULT_TICKERS: &[&str] = &["JPM", "BAC", "C", "WFC", "GS"];
pub const DEFAULT_TITLE: &str = "Financial Analysis of Major US Banks";

/// Smallest figure the 2x2 layout can be drawn into legibly.
pub const MIN_FIGURE_WIDTH: u32 = 400;
pub const MIN_FIGURE_HEIGHT: u32 = 300;
/// Largest figure accepted; the RGB buffer is allocated up front.
pub const MAX_FIGURE_WIDTH: u32 = 8000;
pub const MAX_FIGURE_HEIGHT: u32 = 6000;

/// Figure dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FigureSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 1500,
        }
    }
}

impl FigureSize {
    pub fn as_tuple(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reject sizes the 2x2 layout cannot use or the renderer should not allocate.
    pub fn validate(&self) -> Result<()> {
        let Self { width, height } = *self;
        if width < MIN_FIGURE_WIDTH || height < MIN_FIGURE_HEIGHT {
            return Err(DashboardError::InvalidConfig(format!(
                "figure size {}x{} is below the minimum {}x{}",
                width, height, MIN_FIGURE_WIDTH, MIN_FIGURE_HEIGHT
            )));
        }
        if width > MAX_FIGURE_WIDTH || height > MAX_FIGURE_HEIGHT {
            return Err(DashboardError::InvalidConfig(format!(
                "figure size {}x{} exceeds the maximum {}x{}",
                width, height, MAX_FIGURE_WIDTH, MAX_FIGURE_HEIGHT
            )));
        }
        Ok(())
    }
}

/// Names of the CSV columns the loader reads.
///
/// Header matching is case-insensitive, so `Close` and `close` are equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub date: String,
    pub ticker: String,
    pub close: String,
    /// chrono format string for the date column.
    pub date_format: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            ticker: "Name".to_string(),
            close: "close".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Configuration passed into [`crate::pipeline::run`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub tickers: Vec<String>,
    pub figure_size: FigureSize,
    pub columns: ColumnNames,
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            figure_size: FigureSize::default(),
            columns: ColumnNames::default(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Parse a configuration from YAML. Missing fields keep their defaults.
    pub fn from_yaml_str(yaml_content: &str) -> Result<Self> {
        let config: DashboardConfig = serde_yml::from_str(yaml_content)?;
        Ok(config)
    }

    /// Read and parse a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DashboardError::InputNotFound(path.to_path_buf()),
            _ => DashboardError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Check the configuration before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(DashboardError::InvalidConfig(
                "at least one ticker is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for ticker in &self.tickers {
            let trimmed = ticker.trim();
            if trimmed.is_empty() {
                return Err(DashboardError::InvalidConfig(
                    "ticker symbols cannot be blank".to_string(),
                ));
            }
            if !seen.insert(trimmed) {
                return Err(DashboardError::InvalidConfig(format!(
                    "duplicate ticker '{}'",
                    trimmed
                )));
            }
        }

        self.figure_size.validate()?;

        for (role, name) in [
            ("date", &self.columns.date),
            ("ticker", &self.columns.ticker),
            ("close", &self.columns.close),
        ] {
            if name.trim().is_empty() {
                return Err(DashboardError::InvalidConfig(format!(
                    "{} column name cannot be blank",
                    role
                )));
            }
        }

        if self.columns.date_format.trim().is_empty() {
            return Err(DashboardError::InvalidConfig(
                "date format cannot be blank".to_string(),
            ));
        }

        Ok(())
    }

    /// Tickers with surrounding whitespace removed, in configured order.
    pub fn normalized_tickers(&self) -> Vec<String> {
        self.tickers.iter().map(|t| t.trim().to_string()).collect()
    }
}
