use crate::commands::{analytics_engine, render_charts};
use anyhow::Context;
use api_client::ApiClient;
use chrono::NaiveDate;
use clap::Parser;
use configuration::Config;
use core_types::PriceField;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct StockArgs {
    /// The ticker to analyse (e.g., "AAPL"). Defaults to `market.default_ticker`.
    #[arg(long, short)]
    pub ticker: Option<String>,

    /// The first day of history (format: YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// The day after the last day of history (format: YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// The market index used for beta. Defaults to `market.benchmark`.
    #[arg(long)]
    pub benchmark: Option<String>,

    /// Which price column to analyse.
    #[arg(long, value_enum)]
    pub price_field: Option<PriceField>,
}

/// Fetches the stock and its benchmark, runs the full analysis, and writes
/// `{TICKER}_Financial_Analysis.xlsx` into the output directory.
pub async fn run(args: StockArgs, config: &Config, client: &dyn ApiClient) -> anyhow::Result<PathBuf> {
    let market = &config.market;
    let ticker = args.ticker.unwrap_or_else(|| market.default_ticker.clone());
    let benchmark = args.benchmark.unwrap_or_else(|| market.benchmark.clone());
    let start = args.from.unwrap_or(market.start_date);
    let end = args.to.unwrap_or(market.end_date);
    anyhow::ensure!(start < end, "--from ({start}) must be before --to ({end})");

    println!("Fetching {ticker} from {start} to {end}...");
    let series = client
        .fetch_price_history(&ticker, start, end)
        .await
        .with_context(|| format!("Failed to fetch price history for {ticker}"))?;
    let market_series = client
        .fetch_price_history(&benchmark, start, end)
        .await
        .with_context(|| format!("Failed to fetch benchmark {benchmark}"))?;

    let engine = analytics_engine(config, args.price_field);
    let analysis = engine
        .analyze(&series, &market_series)
        .with_context(|| format!("Failed to analyse {ticker}"))?;

    println!("{}", reporter::console::summary_table(&[analysis.summary.clone()]));

    let charts = render_charts(|| reporter::stock_charts(&analysis));

    let directory = &config.output.directory;
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {}", directory.display()))?;
    let path = reporter::write_stock_workbook(&analysis, &charts, directory)
        .with_context(|| format!("Failed to write the workbook for {ticker}"))?;

    println!("Excel file created: {}", path.display());
    Ok(path)
}
