use api_client::YahooClient;
use clap::{Parser, Subcommand};
use commands::compare::CompareArgs;
use commands::dcf::{DcfArgs, DemoArgs, SampleDataArgs};
use commands::stock::StockArgs;
use configuration::Config;
use std::path::PathBuf;

mod commands;
mod prompt;

/// The main entry point for the finscope application.
#[tokio::main]
async fn main() {
    // Load RUST_LOG and FINSCOPE_* overrides from a .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match configuration::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let guard = match configuration::logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Execute the appropriate command
    if let Err(e) = dispatch(cli.command, &config).await {
        tracing::error!(error = %e, "Command failed.");
        eprintln!("Error: {e:#}");
        drop(guard);
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Discounted cash flow valuation and stock market analysis.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to ./config.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a company from a CSV of historical statements and write a PDF report.
    Dcf(DcfArgs),
    /// Run the DCF pipeline end to end on generated sample data.
    Demo(DemoArgs),
    /// Write the five-year sample statements CSV.
    SampleData(SampleDataArgs),
    /// Analyse one ticker against a benchmark and export an Excel workbook.
    Stock(StockArgs),
    /// Compare several tickers and export per-ticker and combined workbooks.
    Compare(CompareArgs),
}

async fn dispatch(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Dcf(args) => {
            commands::dcf::run(args, config)?;
        }
        Commands::Demo(args) => {
            commands::dcf::run_demo(args, config)?;
        }
        Commands::SampleData(args) => {
            commands::dcf::run_sample_data(args, config)?;
        }
        Commands::Stock(args) => {
            let client = YahooClient::new()?;
            commands::stock::run(args, config, &client).await?;
        }
        Commands::Compare(args) => {
            let client = YahooClient::new()?;
            commands::compare::run(args, config, &client).await?;
        }
    }
    Ok(())
}
