use anyhow::Result;
use bankdash_lib::{CorrelationMatrix, RunStats, TickerSummary};
use chrono::NaiveDate;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Self {
        match name {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
struct SummaryRow {
    #[tabled(rename = "Ticker")]
    #[serde(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Days")]
    #[serde(rename = "Days")]
    days: usize,
    #[tabled(rename = "From")]
    #[serde(rename = "From")]
    first_date: String,
    #[tabled(rename = "To")]
    #[serde(rename = "To")]
    last_date: String,
    #[tabled(rename = "Min")]
    #[serde(rename = "Min")]
    min_close: String,
    #[tabled(rename = "Median")]
    #[serde(rename = "Median")]
    median_close: String,
    #[tabled(rename = "Max")]
    #[serde(rename = "Max")]
    max_close: String,
    #[tabled(rename = "Total Return")]
    #[serde(rename = "Total Return")]
    total_return: String,
    #[tabled(rename = "Mean Daily")]
    #[serde(rename = "Mean Daily")]
    mean_daily_return: String,
    #[tabled(rename = "Volatility")]
    #[serde(rename = "Volatility")]
    daily_volatility: String,
}

/// Everything printed for `--summary json`.
#[derive(Serialize)]
struct SummaryDocument<'a> {
    run: RunStats<'a>,
    summaries: &'a [TickerSummary],
    correlation: &'a CorrelationMatrix,
}

// -- Row builders --

fn build_summary_rows(summaries: &[TickerSummary]) -> Vec<SummaryRow> {
    summaries
        .iter()
        .map(|s| SummaryRow {
            ticker: s.ticker.clone(),
            days: s.observations,
            first_date: format_date(s.first_date),
            last_date: format_date(s.last_date),
            min_close: format_price(s.min_close),
            median_close: format_price(s.median_close),
            max_close: format_price(s.max_close),
            total_return: format_percent(s.total_return),
            mean_daily_return: format_percent(s.mean_daily_return),
            daily_volatility: format_percent(s.daily_volatility),
        })
        .collect()
}

/// Header record followed by one record per ticker.
fn build_correlation_records(matrix: &CorrelationMatrix) -> Vec<Vec<String>> {
    let mut header = vec![String::new()];
    header.extend(matrix.tickers().iter().cloned());

    let mut records = vec![header];
    for (ticker, values) in matrix.rows() {
        let mut record = vec![ticker.to_string()];
        record.extend(values.iter().map(|v| format_correlation(*v)));
        records.push(record);
    }
    records
}

fn correlation_table(matrix: &CorrelationMatrix) -> Table {
    let mut builder = Builder::default();
    for record in build_correlation_records(matrix) {
        builder.push_record(record);
    }
    builder.build()
}

// -- Table output --

pub fn print_summary_table(summaries: &[TickerSummary], matrix: &CorrelationMatrix) {
    println!("{}", Table::new(build_summary_rows(summaries)));
    println!();
    println!("{}", correlation_table(matrix));
}

// -- Markdown output --

pub fn print_summary_markdown(summaries: &[TickerSummary], matrix: &CorrelationMatrix) {
    let mut table = Table::new(build_summary_rows(summaries));
    table.with(Style::markdown());
    println!("{}", table);
    println!();

    let mut table = correlation_table(matrix);
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

pub fn print_summary_csv(summaries: &[TickerSummary], matrix: &CorrelationMatrix) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_summary_rows(summaries) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    println!();

    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for record in build_correlation_records(matrix) {
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- JSON output --

pub fn print_summary_json(
    run: RunStats<'_>,
    summaries: &[TickerSummary],
    matrix: &CorrelationMatrix,
) {
    print_json(&SummaryDocument {
        run,
        summaries,
        correlation: matrix,
    });
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${:.2}", v),
        None => "-".to_string(),
    }
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "-".to_string(),
    }
}

fn format_correlation(value: Option<f64>) -> String {
    match value {
        Some(r) => format!("{:.2}", r),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
