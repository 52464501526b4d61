mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use bankdash_lib::{run, DashboardConfig};
use clap::Parser;

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "bankdash")]
#[command(about = "Render a stock performance dashboard for major US banks")]
struct Cli {
    /// YAML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV of daily stock records
    #[arg(long)]
    input: Option<PathBuf>,

    /// Where to write the PNG dashboard
    #[arg(long)]
    output: Option<PathBuf>,

    /// Comma-separated tickers, e.g. JPM,BAC,C,WFC,GS
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// Figure width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Figure height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Figure title
    #[arg(long)]
    title: Option<String>,

    /// Print per-ticker summary and correlation matrix: table, json, csv or markdown
    #[arg(long, value_parser = ["table", "json", "csv", "markdown"])]
    summary: Option<String>,
}

/// Defaults, then the YAML file, then flags.
fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    if let Some(input) = &cli.input {
        config.input_path = input.clone();
    }
    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if let Some(tickers) = &cli.tickers {
        config.tickers = tickers.clone();
    }
    if let Some(width) = cli.width {
        config.figure_size.width = width;
    }
    if let Some(height) = cli.height {
        config.figure_size.height = height;
    }
    if let Some(title) = &cli.title {
        config.title = title.clone();
    }

    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bankdash=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    tracing::debug!("Resolved configuration: {:?}", config);

    let report = run(&config)?;
    println!(
        "Visualization saved successfully as '{}'",
        report.output_path.display()
    );

    if let Some(name) = &cli.summary {
        let tables = &report.tables;
        match OutputFormat::parse(name) {
            OutputFormat::Table => {
                output::print_summary_table(&tables.summaries, &tables.correlation)
            }
            OutputFormat::Markdown => {
                output::print_summary_markdown(&tables.summaries, &tables.correlation)
            }
            OutputFormat::Csv => {
                output::print_summary_csv(&tables.summaries, &tables.correlation)?
            }
            OutputFormat::Json => {
                output::print_summary_json(report.stats(), &tables.summaries, &tables.correlation)
            }
        }
    }

    Ok(())
}
