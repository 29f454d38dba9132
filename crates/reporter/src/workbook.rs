use crate::charts::ChartImage;
use crate::error::ReportError;
use analytics::{AnalysisColumn, StockAnalysis};
use rust_xlsxwriter::{Image, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};

pub const STOCK_DATA_SHEET: &str = "Stock Data";
pub const ANALYSIS_SHEET: &str = "Analysis";
pub const CHARTS_SHEET: &str = "Charts";
pub const COMPARISON_CHARTS_SHEET: &str = "Comparison Charts";
pub const COMPARISON_FILE: &str = "Multi_Stock_Comparison.xlsx";

/// Rows between stacked chart images (A1, A21, A41, ...).
const CHART_ROW_STRIDE: u32 = 20;

const OHLCV_HEADERS: [&str; 6] = ["Open", "High", "Low", "Close", "Adj Close", "Volume"];

/// `{TICKER}_Financial_Analysis.xlsx`
pub fn stock_workbook_name(symbol: &str) -> String {
    format!("{symbol}_Financial_Analysis.xlsx")
}

/// Writes the per-ticker workbook into `directory` and returns its path.
///
/// `Stock Data` holds the raw bars plus every derived column, `Analysis` the
/// analysis columns alone. A `Charts` sheet is added only when charts are given.
pub fn write_stock_workbook(
    analysis: &StockAnalysis,
    charts: &[ChartImage],
    directory: &Path,
) -> Result<PathBuf, ReportError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name(STOCK_DATA_SHEET)?;
    write_stock_data(sheet, analysis)?;

    let sheet = workbook.add_worksheet().set_name(ANALYSIS_SHEET)?;
    write_columns(sheet, analysis, None, analysis.analysis_columns())?;

    if !charts.is_empty() {
        let sheet = workbook.add_worksheet().set_name(CHARTS_SHEET)?;
        insert_charts(sheet, charts)?;
    }

    let path = directory.join(stock_workbook_name(&analysis.symbol));
    workbook.save(&path)?;
    tracing::info!(symbol = %analysis.symbol, path = %path.display(), "Excel file created.");
    Ok(path)
}

/// Writes `Multi_Stock_Comparison.xlsx`: one sheet per ticker with its price,
/// returns, moving averages and volatility, then the comparison charts.
pub fn write_comparison_workbook(
    analyses: &[StockAnalysis],
    charts: &[ChartImage],
    directory: &Path,
) -> Result<PathBuf, ReportError> {
    if analyses.is_empty() {
        return Err(ReportError::Empty("no tickers to compare".to_string()));
    }

    let mut workbook = Workbook::new();
    for analysis in analyses {
        let sheet = workbook.add_worksheet().set_name(sheet_name(&analysis.symbol))?;
        let price_label = analysis.price_field.label();
        write_columns(sheet, analysis, Some(price_label), &AnalysisColumn::BASIC)?;
    }

    let sheet = workbook.add_worksheet().set_name(COMPARISON_CHARTS_SHEET)?;
    insert_charts(sheet, charts)?;

    let path = directory.join(COMPARISON_FILE);
    workbook.save(&path)?;
    tracing::info!(tickers = analyses.len(), path = %path.display(), "Comparison workbook created.");
    Ok(path)
}

fn write_stock_data(sheet: &mut Worksheet, analysis: &StockAnalysis) -> Result<(), XlsxError> {
    let columns = analysis.data_columns();

    sheet.write_string(0, 0, "Date")?;
    for (i, header) in OHLCV_HEADERS.iter().enumerate() {
        sheet.write_string(0, 1 + i as u16, *header)?;
    }
    let derived_start = 1 + OHLCV_HEADERS.len() as u16;
    for (i, column) in columns.iter().enumerate() {
        sheet.write_string(0, derived_start + i as u16, analysis.label(*column))?;
    }

    for (r, row) in analysis.rows.iter().enumerate() {
        let r = r as u32 + 1;
        let bar = &row.bar;
        sheet.write_string(r, 0, bar.date.to_string())?;
        for (c, value) in [bar.open, bar.high, bar.low, bar.close, bar.adj_close, bar.volume as f64]
            .into_iter()
            .enumerate()
        {
            sheet.write_number(r, 1 + c as u16, value)?;
        }
        for (c, column) in columns.iter().enumerate() {
            if let Some(value) = column.value(row).filter(|v| v.is_finite()) {
                sheet.write_number(r, derived_start + c as u16, value)?;
            }
        }
    }
    Ok(())
}

/// Date, an optional price column, then `columns`. Undefined values stay blank.
fn write_columns(
    sheet: &mut Worksheet,
    analysis: &StockAnalysis,
    price_label: Option<&str>,
    columns: &[AnalysisColumn],
) -> Result<(), XlsxError> {
    let offset: u16 = if price_label.is_some() { 2 } else { 1 };

    sheet.write_string(0, 0, "Date")?;
    if let Some(label) = price_label {
        sheet.write_string(0, 1, label)?;
    }
    for (i, column) in columns.iter().enumerate() {
        sheet.write_string(0, offset + i as u16, analysis.label(*column))?;
    }

    for (r, row) in analysis.rows.iter().enumerate() {
        let r = r as u32 + 1;
        sheet.write_string(r, 0, row.date().to_string())?;
        if price_label.is_some() {
            sheet.write_number(r, 1, row.price)?;
        }
        for (c, column) in columns.iter().enumerate() {
            if let Some(value) = column.value(row).filter(|v| v.is_finite()) {
                sheet.write_number(r, offset + c as u16, value)?;
            }
        }
    }
    Ok(())
}

fn insert_charts(sheet: &mut Worksheet, charts: &[ChartImage]) -> Result<(), ReportError> {
    for (i, chart) in charts.iter().enumerate() {
        let image = Image::new_from_buffer(&chart.to_png()?)?;
        sheet.insert_image(i as u32 * CHART_ROW_STRIDE, 0, &image)?;
    }
    Ok(())
}

/// Excel caps sheet names at 31 characters and forbids `[]:*?/\`.
fn sheet_name(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(31)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsEngine;
    use chrono::{Days, NaiveDate};
    use core_types::{PriceBar, PriceSeries};

    fn series(symbol: &str, n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = (0..n)
            .map(|i| {
                let p = 100.0 + (i as f64).sin() * 5.0 + i as f64;
                PriceBar {
                    date: start + Days::new(i as u64),
                    open: p,
                    high: p + 1.0,
                    low: p - 1.0,
                    close: p,
                    adj_close: p,
                    volume: 1_000 + i as u64,
                }
            })
            .collect();
        PriceSeries::new(symbol, bars)
    }

    fn blank_chart() -> ChartImage {
        ChartImage::from_rgb("blank", 4, 3, vec![255; 36]).unwrap()
    }

    fn assert_xlsx(path: &Path) {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"PK"), "{} is not a zip archive", path.display());
    }

    #[test]
    fn stock_workbook_is_named_after_the_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let stock = series("AAPL", 60);
        let analysis = AnalyticsEngine::default()
            .analyze(&stock, &series("^GSPC", 60))
            .unwrap();

        let charts = vec![blank_chart(), blank_chart(), blank_chart()];
        let path = write_stock_workbook(&analysis, &charts, dir.path()).unwrap();

        assert_eq!(path, dir.path().join("AAPL_Financial_Analysis.xlsx"));
        assert_xlsx(&path);
    }

    #[test]
    fn comparison_workbook_holds_every_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let engine = AnalyticsEngine::default();
        let analyses: Vec<_> = ["AAPL", "TSLA"]
            .iter()
            .map(|s| engine.analyze_basic(&series(s, 40)).unwrap())
            .collect();

        let path =
            write_comparison_workbook(&analyses, &[blank_chart(), blank_chart()], dir.path())
                .unwrap();
        assert_eq!(path.file_name().unwrap(), COMPARISON_FILE);
        assert_xlsx(&path);
    }

    #[test]
    fn comparison_of_nothing_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            write_comparison_workbook(&[], &[], dir.path()),
            Err(ReportError::Empty(_))
        ));
    }

    #[test]
    fn sheet_names_are_sanitised() {
        assert_eq!(sheet_name("BRK/B"), "BRK_B");
        assert_eq!(sheet_name(&"X".repeat(40)).len(), 31);
    }
}
