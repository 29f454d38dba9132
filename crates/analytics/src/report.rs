use chrono::NaiveDate;
use configuration::IndicatorSettings;
use core_types::{PriceBar, PriceField};
use serde::{Deserialize, Serialize};

/// One trading day with every derived indicator.
///
/// Indicators the analysis did not compute, or whose window is not yet full,
/// are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub bar: PriceBar,
    /// The bar's price in the analysed field.
    pub price: f64,
    pub daily_return: Option<f64>,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub volatility: Option<f64>,
    pub rsi: Option<f64>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
    pub ema_short: Option<f64>,
    pub ema_long: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub beta: Option<f64>,
    pub excess_return: Option<f64>,
}

impl AnalysisRow {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }
}

/// How much of the indicator set was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisDepth {
    /// Returns, both moving averages and volatility.
    Basic,
    /// Everything, including benchmark-relative statistics.
    Full,
}

/// A derived column, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisColumn {
    DailyReturn,
    MaShort,
    MaLong,
    Volatility,
    Rsi,
    UpperBand,
    LowerBand,
    EmaShort,
    EmaLong,
    MaxDrawdown,
    Beta,
    ExcessReturn,
}

impl AnalysisColumn {
    pub const BASIC: [AnalysisColumn; 4] = [
        AnalysisColumn::DailyReturn,
        AnalysisColumn::MaShort,
        AnalysisColumn::MaLong,
        AnalysisColumn::Volatility,
    ];

    /// The analysis sheet of a full run. Excess return stays on the data sheet.
    pub const ANALYSIS: [AnalysisColumn; 11] = [
        AnalysisColumn::DailyReturn,
        AnalysisColumn::MaShort,
        AnalysisColumn::MaLong,
        AnalysisColumn::Volatility,
        AnalysisColumn::Rsi,
        AnalysisColumn::UpperBand,
        AnalysisColumn::LowerBand,
        AnalysisColumn::EmaShort,
        AnalysisColumn::EmaLong,
        AnalysisColumn::MaxDrawdown,
        AnalysisColumn::Beta,
    ];

    /// Every derived column.
    pub const ALL: [AnalysisColumn; 12] = [
        AnalysisColumn::DailyReturn,
        AnalysisColumn::MaShort,
        AnalysisColumn::MaLong,
        AnalysisColumn::Volatility,
        AnalysisColumn::Rsi,
        AnalysisColumn::UpperBand,
        AnalysisColumn::LowerBand,
        AnalysisColumn::EmaShort,
        AnalysisColumn::EmaLong,
        AnalysisColumn::MaxDrawdown,
        AnalysisColumn::Beta,
        AnalysisColumn::ExcessReturn,
    ];

    pub fn value(self, row: &AnalysisRow) -> Option<f64> {
        match self {
            AnalysisColumn::DailyReturn => row.daily_return,
            AnalysisColumn::MaShort => row.ma_short,
            AnalysisColumn::MaLong => row.ma_long,
            AnalysisColumn::Volatility => row.volatility,
            AnalysisColumn::Rsi => row.rsi,
            AnalysisColumn::UpperBand => row.upper_band,
            AnalysisColumn::LowerBand => row.lower_band,
            AnalysisColumn::EmaShort => row.ema_short,
            AnalysisColumn::EmaLong => row.ema_long,
            AnalysisColumn::MaxDrawdown => row.max_drawdown,
            AnalysisColumn::Beta => row.beta,
            AnalysisColumn::ExcessReturn => row.excess_return,
        }
    }

    /// Header text, with the configured window lengths baked in ("50-Day MA").
    pub fn label(self, windows: &IndicatorSettings) -> String {
        match self {
            AnalysisColumn::DailyReturn => "Daily Return".to_string(),
            AnalysisColumn::MaShort => format!("{}-Day MA", windows.ma_short_window),
            AnalysisColumn::MaLong => format!("{}-Day MA", windows.ma_long_window),
            AnalysisColumn::Volatility => "Volatility".to_string(),
            AnalysisColumn::Rsi => "RSI".to_string(),
            AnalysisColumn::UpperBand => "Upper Band".to_string(),
            AnalysisColumn::LowerBand => "Lower Band".to_string(),
            AnalysisColumn::EmaShort => format!("{}-Day EMA", windows.ema_short_span),
            AnalysisColumn::EmaLong => format!("{}-Day EMA", windows.ema_long_span),
            AnalysisColumn::MaxDrawdown => "Max Drawdown".to_string(),
            AnalysisColumn::Beta => "Beta".to_string(),
            AnalysisColumn::ExcessReturn => "Excess Return".to_string(),
        }
    }
}

/// Scalar statistics over the whole history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub symbol: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub observations: usize,
    pub last_price: f64,
    pub total_return: Option<f64>,
    /// Deepest peak-to-trough decline over the entire history.
    pub max_drawdown: f64,
    pub beta: Option<f64>,
    /// Per-period, not annualized.
    pub sharpe_ratio: Option<f64>,
}

/// The output of `AnalyticsEngine` for one symbol.
#[derive(Debug, Clone)]
pub struct StockAnalysis {
    pub symbol: String,
    pub price_field: PriceField,
    pub depth: AnalysisDepth,
    pub windows: IndicatorSettings,
    pub rows: Vec<AnalysisRow>,
    pub summary: PerformanceSummary,
}

impl StockAnalysis {
    /// Derived columns that follow the raw OHLCV columns on the data sheet.
    pub fn data_columns(&self) -> &'static [AnalysisColumn] {
        match self.depth {
            AnalysisDepth::Basic => &AnalysisColumn::BASIC,
            AnalysisDepth::Full => &AnalysisColumn::ALL,
        }
    }

    /// Columns exported on the analysis sheet.
    pub fn analysis_columns(&self) -> &'static [AnalysisColumn] {
        match self.depth {
            AnalysisDepth::Basic => &AnalysisColumn::BASIC,
            AnalysisDepth::Full => &AnalysisColumn::ANALYSIS,
        }
    }

    pub fn label(&self, column: AnalysisColumn) -> String {
        column.label(&self.windows)
    }

    /// `(date, value)` pairs for one column.
    pub fn column(&self, column: AnalysisColumn) -> Vec<(NaiveDate, Option<f64>)> {
        self.rows
            .iter()
            .map(|row| (row.date(), column.value(row)))
            .collect()
    }

    pub fn prices(&self) -> Vec<(NaiveDate, f64)> {
        self.rows.iter().map(|row| (row.date(), row.price)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_configured_windows() {
        let mut windows = IndicatorSettings::default();
        assert_eq!(AnalysisColumn::MaShort.label(&windows), "50-Day MA");
        assert_eq!(AnalysisColumn::EmaLong.label(&windows), "50-Day EMA");

        windows.ma_long_window = 100;
        assert_eq!(AnalysisColumn::MaLong.label(&windows), "100-Day MA");
    }

    #[test]
    fn analysis_sheet_is_data_sheet_without_excess_return() {
        assert_eq!(AnalysisColumn::ANALYSIS[..], AnalysisColumn::ALL[..11]);
        assert!(!AnalysisColumn::ANALYSIS.contains(&AnalysisColumn::ExcessReturn));
    }
}
