//! CSV loader producing the per-ticker price table.
//!
//! The header row is validated against the configured column names before any
//! data row is read. Rows for tickers outside the configured set are ignored.
//! Rows for configured tickers that cannot be parsed are skipped and counted;
//! the first record for a `(ticker, date)` pair wins over later duplicates.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;

use crate::config::{ColumnNames, DashboardConfig};
use crate::error::{DashboardError, Result};
use crate::table::{PricePoint, PriceTable, TickerTable};

/// Malformed rows logged individually before falling back to a summary line.
const MAX_LOGGED_SKIPS: usize = 5;

/// What the loader saw while building the price table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_other_tickers: usize,
    pub malformed_rows: usize,
    pub duplicate_rows: usize,
    /// Configured tickers with no rows in the file.
    pub missing_tickers: Vec<String>,
}

/// Positions of the required columns within a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    date: usize,
    ticker: usize,
    close: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &ColumnNames) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            let wanted = name.trim().to_lowercase();
            headers
                .iter()
                .position(|h| h.trim().to_lowercase() == wanted)
                .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: find(&columns.date)?,
            ticker: find(&columns.ticker)?,
            close: find(&columns.close)?,
        })
    }
}

/// Why a data row for a configured ticker was rejected.
#[derive(Debug, Clone, PartialEq)]
enum RowProblem {
    MissingField(&'static str),
    BadDate(String),
    BadClose(String),
}

impl std::fmt::Display for RowProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing {} field", field),
            Self::BadDate(raw) => write!(f, "unparseable date '{}'", raw),
            Self::BadClose(raw) => write!(f, "invalid close price '{}'", raw),
        }
    }
}

/// Parse a date cell with the configured format, accepting full timestamps as a fallback.
pub fn parse_date(raw: &str, format: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Parse a close cell. Empty, non-numeric and non-finite values are rejected.
pub fn parse_close(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_row(
    record: &StringRecord,
    index: ColumnIndex,
    date_format: &str,
) -> std::result::Result<(NaiveDate, f64), RowProblem> {
    let raw_date = record
        .get(index.date)
        .ok_or(RowProblem::MissingField("date"))?;
    let raw_close = record
        .get(index.close)
        .ok_or(RowProblem::MissingField("close"))?;

    let date = parse_date(raw_date, date_format)
        .ok_or_else(|| RowProblem::BadDate(raw_date.to_string()))?;
    let close =
        parse_close(raw_close).ok_or_else(|| RowProblem::BadClose(raw_close.to_string()))?;

    Ok((date, close))
}

/// Load the price table for the configured tickers from `config.input_path`.
pub fn load_prices(config: &DashboardConfig) -> Result<(PriceTable, LoadReport)> {
    let path = &config.input_path;
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DashboardError::InputNotFound(path.clone()),
        _ => DashboardError::Io {
            path: path.clone(),
            source: e,
        },
    })?;

    tracing::info!("Loading price data from {}", path.display());
    load_prices_from_reader(file, &config.normalized_tickers(), &config.columns)
}

/// Load the price table from any CSV source.
///
/// Every ticker in `tickers` gets an entry in the returned table, in the same
/// order, even when the source has no rows for it.
pub fn load_prices_from_reader<R: Read>(
    reader: R,
    tickers: &[String],
    columns: &ColumnNames,
) -> Result<(PriceTable, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let index = ColumnIndex::resolve(&headers, columns)?;

    let mut by_ticker: HashMap<&str, BTreeMap<NaiveDate, f64>> = tickers
        .iter()
        .map(|t| (t.as_str(), BTreeMap::new()))
        .collect();
    let mut report = LoadReport::default();

    for result in rdr.records() {
        let record = result?;
        report.rows_read += 1;

        let Some(series) = record
            .get(index.ticker)
            .and_then(|ticker| by_ticker.get_mut(ticker.trim()))
        else {
            report.rows_other_tickers += 1;
            continue;
        };

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        match parse_row(&record, index, &columns.date_format) {
            Ok((date, close)) => {
                if series.contains_key(&date) {
                    report.duplicate_rows += 1;
                    tracing::warn!(
                        "Duplicate record on line {} for {}, keeping the first",
                        line,
                        date
                    );
                } else {
                    series.insert(date, close);
                    report.rows_kept += 1;
                }
            }
            Err(problem) => {
                report.malformed_rows += 1;
                if report.malformed_rows <= MAX_LOGGED_SKIPS {
                    tracing::warn!("Skipping line {}: {}", line, problem);
                }
            }
        }
    }

    if report.malformed_rows > MAX_LOGGED_SKIPS {
        tracing::warn!("Skipped {} malformed rows in total", report.malformed_rows);
    }

    let entries: Vec<(String, Vec<PricePoint>)> = tickers
        .iter()
        .map(|ticker| {
            let series: Vec<PricePoint> = by_ticker
                .remove(ticker.as_str())
                .unwrap_or_default()
                .into_iter()
                .map(|(date, close)| PricePoint { date, close })
                .collect();
            if series.is_empty() {
                tracing::warn!("No price data found for ticker {}", ticker);
                report.missing_tickers.push(ticker.clone());
            } else {
                tracing::debug!("{}: {} closing prices", ticker, series.len());
            }
            (ticker.clone(), series)
        })
        .collect();

    tracing::info!(
        "Read {} rows, kept {} for {} tickers",
        report.rows_read,
        report.rows_kept,
        tickers.len()
    );

    Ok((TickerTable::new(entries), report))
}
