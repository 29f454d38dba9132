use crate::commands::{analytics_engine, render_charts};
use analytics::StockAnalysis;
use anyhow::Context;
use api_client::ApiClient;
use chrono::NaiveDate;
use clap::Parser;
use configuration::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Comma-separated tickers (e.g., "AAPL,TSLA,GOOGL"). Defaults to `market.tickers`.
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// The first day of history (format: YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// The day after the last day of history (format: YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

/// Runs the basic analysis for each ticker, writing its own workbook, then the
/// combined comparison workbook.
///
/// A ticker that cannot be fetched or analysed is reported and skipped; the
/// command fails only when none succeed.
pub async fn run(
    args: CompareArgs,
    config: &Config,
    client: &dyn ApiClient,
) -> anyhow::Result<PathBuf> {
    let market = &config.market;
    let tickers = unique_tickers(if args.tickers.is_empty() {
        &market.tickers
    } else {
        &args.tickers
    });
    anyhow::ensure!(!tickers.is_empty(), "No tickers to compare");
    let start = args.from.unwrap_or(market.start_date);
    let end = args.to.unwrap_or(market.end_date);
    anyhow::ensure!(start < end, "--from ({start}) must be before --to ({end})");

    let directory = &config.output.directory;
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {}", directory.display()))?;

    let engine = analytics_engine(config, None);

    let progress_bar = ProgressBar::new(tickers.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut analyses: Vec<StockAnalysis> = Vec::with_capacity(tickers.len());
    for ticker in &tickers {
        progress_bar.set_message(format!("Analysing {ticker}..."));
        let outcome = async {
            let series = client.fetch_price_history(ticker, start, end).await?;
            let analysis = engine.analyze_basic(&series)?;
            reporter::write_stock_workbook(&analysis, &[], directory)?;
            Ok::<_, anyhow::Error>(analysis)
        }
        .await;

        match outcome {
            Ok(analysis) => analyses.push(analysis),
            Err(e) => {
                tracing::warn!(ticker = %ticker, error = %e, "Skipping ticker.");
                progress_bar.suspend(|| eprintln!("Error analyzing {ticker}: {e}"));
            }
        }
        progress_bar.inc(1);
    }
    progress_bar.finish_with_message("Analysis complete!");

    anyhow::ensure!(
        !analyses.is_empty(),
        "None of the tickers could be analysed: {}",
        tickers.join(", ")
    );

    let charts = render_charts(|| reporter::comparison_charts(&analyses));
    let path = reporter::write_comparison_workbook(&analyses, &charts, directory)
        .context("Failed to write the comparison workbook")?;

    let summaries: Vec<_> = analyses.iter().map(|a| a.summary.clone()).collect();
    println!("{}", reporter::console::summary_table(&summaries));
    println!("Comparison workbook created: {}", path.display());
    Ok(path)
}

/// Trimmed, non-empty tickers in first-seen order. Workbook sheet names are
/// case-insensitive, so `aapl` repeats `AAPL`.
fn unique_tickers(tickers: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tickers
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && seen.insert(t.to_uppercase()))
        .map(str::to_string)
        .collect()
}
