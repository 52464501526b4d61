//! Library layer for the bank stock dashboard: loading, derived series, statistics, and charts.
//!
//! Reads daily closing prices for a fixed set of bank tickers from CSV, derives
//! daily returns and their correlation matrix, and renders a 2x2 PNG dashboard.

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod render;
pub mod returns;
pub mod stats;
pub mod table;

pub use config::{ColumnNames, DashboardConfig, FigureSize};
pub use error::{DashboardError, Result};
pub use loader::{load_prices, load_prices_from_reader, LoadReport};
pub use pipeline::{build_tables, run, DashboardReport, DashboardTables, RunStats};
pub use returns::daily_returns;
pub use stats::{correlation_matrix, summarize, BoxStats, CorrelationMatrix, TickerSummary};
pub use table::{PricePoint, PriceTable, ReturnPoint, ReturnTable, TickerTable};
