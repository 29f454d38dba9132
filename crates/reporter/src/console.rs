use crate::format::{format_currency, format_percent, format_ratio, format_ratio_percent};
use analytics::PerformanceSummary;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use core_types::{DcfAnalysis, ValuationResult};

/// The four valuation figures as a two-column table.
pub fn valuation_table(valuation: &ValuationResult) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    for (label, value) in valuation.rows() {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(format_currency(value)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Historical and projected free cash flow, one row per period.
pub fn cash_flow_table(analysis: &DcfAnalysis) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Period", "Revenue", "EBIT", "FCF", "Growth"]);

    for row in &analysis.history {
        table.add_row(vec![
            Cell::new(row.record.period.as_deref().unwrap_or("-")),
            money(row.record.revenue),
            money(row.ebit),
            money(row.fcf),
            Cell::new(""),
        ]);
    }
    for row in &analysis.projection.records {
        table.add_row(vec![
            Cell::new(format!("+{}", row.year)),
            money(row.revenue),
            money(row.ebit),
            money(row.fcf),
            Cell::new(format_percent(row.growth_rate)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// One row per analysed ticker.
pub fn summary_table(summaries: &[PerformanceSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Ticker",
        "From",
        "To",
        "Last Price",
        "Total Return",
        "Max Drawdown",
        "Beta",
        "Sharpe",
    ]);
    for s in summaries {
        table.add_row(vec![
            Cell::new(&s.symbol),
            Cell::new(s.first_date),
            Cell::new(s.last_date),
            Cell::new(format!("{:.2}", s.last_price)).set_alignment(CellAlignment::Right),
            Cell::new(format_ratio_percent(s.total_return)).set_alignment(CellAlignment::Right),
            Cell::new(format_ratio_percent(Some(s.max_drawdown)))
                .set_alignment(CellAlignment::Right),
            Cell::new(format_ratio(s.beta)).set_alignment(CellAlignment::Right),
            Cell::new(format_ratio(s.sharpe_ratio)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn money(value: rust_decimal::Decimal) -> Cell {
    Cell::new(format_currency(value)).set_alignment(CellAlignment::Right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn valuation_table_lists_rows_in_report_order() {
        let table = valuation_table(&ValuationResult {
            pv_fcf: dec!(1229818.615),
            terminal_value: dec!(4502740.65),
            pv_terminal_value: dec!(2795847.68),
            total_value: dec!(4025666.30),
        });
        let text = table.to_string();

        let pv = text.find("PV of FCF").unwrap();
        let total = text.find("Total Value").unwrap();
        assert!(pv < total);
        assert!(text.contains("$1,229,818.62"));
        assert!(text.contains("$4,025,666.30"));
    }
}
