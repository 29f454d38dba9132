use crate::assumptions::ProjectionAssumptions;
use crate::enums::PriceField;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One past period of raw financial statement line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    /// Free-form period label (e.g. "2023"), taken from an optional `Year` column.
    pub period: Option<String>,
    pub revenue: Decimal,
    pub operating_expenses: Decimal,
    pub depreciation: Decimal,
    pub capex: Decimal,
    pub change_in_working_capital: Decimal,
}

/// A historical period augmented with its derived profitability and cash flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRecord {
    pub record: HistoricalRecord,
    pub ebit: Decimal,
    pub nopat: Decimal,
    pub fcf: Decimal,
}

/// One future period produced by the projector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRecord {
    /// 1-based offset from the last historical period.
    pub year: u32,
    pub growth_rate: Decimal,
    pub revenue: Decimal,
    pub ebit: Decimal,
    pub fcf: Decimal,
}

/// Everything the projector derives from history, kept together so the reporter
/// can chart the glide path without recomputing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub historical_growth: Decimal,
    pub average_margin: Decimal,
    pub growth_rates: Vec<Decimal>,
    pub records: Vec<ProjectedRecord>,
}

impl Projection {
    pub fn fcf(&self) -> Vec<Decimal> {
        self.records.iter().map(|r| r.fcf).collect()
    }
}

/// The four headline outputs of a discounted cash flow valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub pv_fcf: Decimal,
    pub terminal_value: Decimal,
    pub pv_terminal_value: Decimal,
    pub total_value: Decimal,
}

impl ValuationResult {
    /// Labelled rows in report order.
    pub fn rows(&self) -> [(&'static str, Decimal); 4] {
        [
            ("PV of FCF", self.pv_fcf),
            ("Terminal Value", self.terminal_value),
            ("PV of Terminal Value", self.pv_terminal_value),
            ("Total Value", self.total_value),
        ]
    }
}

/// The complete, immutable output of one valuation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfAnalysis {
    pub assumptions: ProjectionAssumptions,
    pub history: Vec<CashFlowRecord>,
    pub projection: Projection,
    pub valuation: ValuationResult,
}

impl DcfAnalysis {
    pub fn historical_fcf(&self) -> Vec<Decimal> {
        self.history.iter().map(|r| r.fcf).collect()
    }
}

/// A single daily bar from the market data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn price(&self, field: PriceField) -> f64 {
        match field {
            PriceField::AdjClose => self.adj_close,
            PriceField::Close => self.close,
        }
    }
}

/// The daily history of one symbol, oldest bar first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn prices(&self, field: PriceField) -> Vec<f64> {
        self.bars.iter().map(|b| b.price(field)).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> PriceBar {
        PriceBar {
            date: date.parse().unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            adj_close: close * 0.5,
            volume: 100,
        }
    }

    #[test]
    fn price_series_is_sorted_by_date() {
        let series = PriceSeries::new(
            "AAPL",
            vec![bar("2024-01-03", 3.0), bar("2024-01-02", 2.0)],
        );
        assert_eq!(series.prices(PriceField::Close), vec![2.0, 3.0]);
        assert_eq!(series.prices(PriceField::AdjClose), vec![1.0, 1.5]);
    }
}
