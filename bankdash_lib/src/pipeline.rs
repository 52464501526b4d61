//! End-to-end dashboard run: load, derive, summarize, render.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::loader::{load_prices, LoadReport};
use crate::render::{export_png, DashboardData};
use crate::returns::daily_returns;
use crate::stats::{correlation_matrix, summarize, CorrelationMatrix, TickerSummary};
use crate::table::{PriceTable, ReturnTable};

/// Numeric results of a run, before anything is drawn.
#[derive(Debug, Clone)]
pub struct DashboardTables {
    pub prices: PriceTable,
    pub returns: ReturnTable,
    pub correlation: CorrelationMatrix,
    pub summaries: Vec<TickerSummary>,
    pub load_report: LoadReport,
}

impl DashboardTables {
    pub fn data(&self) -> DashboardData<'_> {
        DashboardData {
            prices: &self.prices,
            returns: &self.returns,
            correlation: &self.correlation,
        }
    }
}

/// Outcome of a successful [`run`].
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub output_path: PathBuf,
    pub tables: DashboardTables,
}

/// Counts reported after a run, in a form suitable for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats<'a> {
    pub output_path: &'a std::path::Path,
    pub tickers: usize,
    pub price_points: usize,
    pub return_points: usize,
    pub load: &'a LoadReport,
}

impl DashboardReport {
    pub fn stats(&self) -> RunStats<'_> {
        RunStats {
            output_path: &self.output_path,
            tickers: self.tables.prices.len(),
            price_points: self.tables.prices.total_points(),
            return_points: self.tables.returns.total_points(),
            load: &self.tables.load_report,
        }
    }
}

/// Validate the configuration and compute every table the dashboard shows.
pub fn build_tables(config: &DashboardConfig) -> Result<DashboardTables> {
    config.validate()?;

    let (prices, load_report) = load_prices(config)?;
    info!(
        "Loaded {} price points for {} tickers from {}",
        prices.total_points(),
        prices.len(),
        config.input_path.display()
    );

    let returns = daily_returns(&prices);
    for (ticker, series) in returns.iter() {
        debug!("{}: {} daily returns", ticker, series.len());
    }

    let correlation = correlation_matrix(&returns);
    let summaries = summarize(&prices, &returns);
    info!(
        "Computed {} daily returns and a {}x{} correlation matrix",
        returns.total_points(),
        correlation.size(),
        correlation.size()
    );

    Ok(DashboardTables {
        prices,
        returns,
        correlation,
        summaries,
        load_report,
    })
}

/// Build the tables and write the PNG to `config.output_path`.
pub fn run(config: &DashboardConfig) -> Result<DashboardReport> {
    let tables = build_tables(config)?;

    let (width, height) = config.figure_size.as_tuple();
    info!("Rendering {}x{} dashboard", width, height);
    export_png(&config.output_path, &tables.data(), config)?;
    info!("Saved dashboard to {}", config.output_path.display());

    Ok(DashboardReport {
        output_path: config.output_path.clone(),
        tables,
    })
}
