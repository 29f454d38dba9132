use crate::commands::render_charts;
use crate::prompt::{
    PROJECTION_YEARS_PROMPT, TERMINAL_GROWTH_PROMPT, WACC_PROMPT, prompt_until_valid,
};
use anyhow::Context;
use clap::Parser;
use configuration::Config;
use core_types::{
    DcfAnalysis, HistoricalRecord, ProjectionAssumptions, parse_projection_years,
    parse_terminal_growth, parse_wacc,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use valuation::DcfEngine;

#[derive(Parser, Debug)]
pub struct DcfArgs {
    /// CSV of historical financial statements.
    #[arg(long, short)]
    pub input: PathBuf,

    /// Discount rate as a decimal (e.g., 0.10). Prompted for when omitted.
    #[arg(long, value_parser = parse_wacc)]
    pub wacc: Option<Decimal>,

    /// Perpetual growth rate as a decimal. Prompted for when omitted.
    #[arg(long, value_parser = parse_terminal_growth, allow_hyphen_values = true)]
    pub terminal_growth: Option<Decimal>,

    /// Number of years to project (1-10). Prompted for when omitted.
    #[arg(long, value_parser = parse_projection_years)]
    pub years: Option<u32>,

    /// Where to write the PDF report. Defaults to `dcf.report_path`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the full analysis as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Leave the generated statements CSV in place after the run.
    #[arg(long)]
    pub keep_data: bool,
}

#[derive(Parser, Debug)]
pub struct SampleDataArgs {
    /// Where to write the CSV. Defaults to `dcf.demo_data_path`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Loads the statements, fills in any missing assumptions interactively, then
/// values and reports.
pub fn run(args: DcfArgs, config: &Config) -> anyhow::Result<DcfAnalysis> {
    let records = statements::load_statements(&args.input)
        .with_context(|| format!("Error loading file {}", args.input.display()))?;
    println!("Financial statements loaded successfully!");

    let stdin = std::io::stdin();
    let assumptions = resolve_assumptions(
        args.wacc,
        args.terminal_growth,
        args.years,
        &mut stdin.lock(),
        &mut std::io::stdout(),
    )?;

    let output = args.output.unwrap_or_else(|| config.dcf.report_path.clone());
    value_and_report(&records, &assumptions, config, &output, args.json)
}

/// Writes the synthetic dataset, values it at WACC 10%, growth 2% over five
/// years, and writes the test report.
pub fn run_demo(args: DemoArgs, config: &Config) -> anyhow::Result<DcfAnalysis> {
    println!("Starting DCF Analysis test run...");
    let data_path = &config.dcf.demo_data_path;
    statements::write_sample_statements(data_path)
        .with_context(|| format!("Error creating test data at {}", data_path.display()))?;

    let result = (|| -> anyhow::Result<DcfAnalysis> {
        let records = statements::load_statements(data_path)?;
        let assumptions = ProjectionAssumptions::new(dec!(0.10), dec!(0.02), 5)?;
        println!("\nTest inputs:");
        println!("WACC: {}", assumptions.wacc);
        println!("Terminal Growth: {}", assumptions.terminal_growth);
        println!("Projection Years: {}", assumptions.projection_years);

        value_and_report(&records, &assumptions, config, &config.dcf.demo_report_path, false)
    })();

    if !args.keep_data {
        match std::fs::remove_file(data_path) {
            Ok(()) => println!("Test data file cleaned up."),
            Err(e) => tracing::warn!(path = %data_path.display(), error = %e, "Error cleaning up test file."),
        }
    }

    let analysis = result?;
    println!("\nTest run completed successfully!");
    println!(
        "Please check '{}' for the results.",
        config.dcf.demo_report_path.display()
    );
    Ok(analysis)
}

pub fn run_sample_data(args: SampleDataArgs, config: &Config) -> anyhow::Result<PathBuf> {
    let path = args
        .output
        .unwrap_or_else(|| config.dcf.demo_data_path.clone());
    statements::write_sample_statements(&path)
        .with_context(|| format!("Error creating test data at {}", path.display()))?;
    println!("Test data created successfully: {}", path.display());
    Ok(path)
}

/// Takes each assumption from the command line when given, otherwise prompts.
pub fn resolve_assumptions<R: BufRead, W: Write>(
    wacc: Option<Decimal>,
    terminal_growth: Option<Decimal>,
    years: Option<u32>,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<ProjectionAssumptions> {
    if wacc.is_none() || terminal_growth.is_none() || years.is_none() {
        writeln!(output, "\n=== DCF Analysis Parameters ===")?;
    }

    let wacc = match wacc {
        Some(v) => v,
        None => prompt_until_valid(WACC_PROMPT, parse_wacc, input, output)?,
    };
    let terminal_growth = match terminal_growth {
        Some(v) => v,
        None => prompt_until_valid(TERMINAL_GROWTH_PROMPT, parse_terminal_growth, input, output)?,
    };
    let years = match years {
        Some(v) => v,
        None => prompt_until_valid(PROJECTION_YEARS_PROMPT, parse_projection_years, input, output)?,
    };

    Ok(ProjectionAssumptions::new(wacc, terminal_growth, years)?)
}

fn value_and_report(
    records: &[HistoricalRecord],
    assumptions: &ProjectionAssumptions,
    config: &Config,
    output: &Path,
    json: bool,
) -> anyhow::Result<DcfAnalysis> {
    let engine = DcfEngine::new(config.dcf.tax_rate, config.dcf.enforce_rate_spread);
    let analysis = engine.run(records, assumptions).map_err(|e| {
        let context = if e.is_computation() {
            "Error calculating DCF value"
        } else {
            "Invalid DCF inputs"
        };
        anyhow::Error::new(e).context(context)
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", reporter::console::cash_flow_table(&analysis));
        println!("\nDCF Values:");
        println!("{}", reporter::console::valuation_table(&analysis.valuation));
    }

    let charts = render_charts(|| {
        Ok(vec![
            reporter::fcf_chart(&analysis)?,
            reporter::growth_chart(&analysis)?,
        ])
    });
    reporter::write_dcf_report(&analysis, &charts, output)
        .with_context(|| format!("Error generating PDF report {}", output.display()))?;
    println!("\nPDF report generated: {}", output.display());

    Ok(analysis)
}
