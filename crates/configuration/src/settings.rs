use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::PriceField;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its `Default`, so an empty or missing
/// `config.toml` yields a fully usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dcf: DcfSettings,
    pub market: MarketSettings,
    pub indicators: IndicatorSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

/// Contains parameters for the discounted cash flow valuation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DcfSettings {
    /// Corporate tax rate applied to EBIT. 0.21 corresponds to 21%.
    pub tax_rate: Decimal,
    /// Reject runs where WACC does not exceed the terminal growth rate.
    /// When disabled, a WACC below the growth rate yields a negative terminal value.
    pub enforce_rate_spread: bool,
    /// Where `dcf` writes its PDF report.
    pub report_path: PathBuf,
    /// Where `demo` writes its PDF report.
    pub demo_report_path: PathBuf,
    /// Where `demo` writes its synthetic statements before loading them back.
    pub demo_data_path: PathBuf,
}

/// Market data parameters shared by the `stock` and `compare` commands.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    /// The index used as the market when computing beta.
    pub benchmark: String,
    /// The ticker analysed by `stock` when none is given.
    pub default_ticker: String,
    /// The tickers compared by `compare` when none are given.
    pub tickers: Vec<String>,
    /// Inclusive start of the history window.
    pub start_date: NaiveDate,
    /// Exclusive end of the history window.
    pub end_date: NaiveDate,
    pub price_field: PriceField,
    /// Annual risk-free rate used for excess returns. 0.02 corresponds to 2%.
    pub risk_free_rate: f64,
    pub trading_days_per_year: u32,
}

/// Window lengths for the technical indicators.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub ma_short_window: usize,
    pub ma_long_window: usize,
    pub volatility_window: usize,
    pub rsi_period: usize,
    pub bollinger_window: usize,
    pub bollinger_std_dev: f64,
    pub ema_short_span: usize,
    pub ema_long_span: usize,
    pub drawdown_window: usize,
    pub histogram_bins: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory that receives the workbooks.
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for DcfSettings {
    fn default() -> Self {
        Self {
            tax_rate: dec!(0.21),
            enforce_rate_spread: true,
            report_path: PathBuf::from("dcf_analysis.pdf"),
            demo_report_path: PathBuf::from("test_dcf_analysis.pdf"),
            demo_data_path: PathBuf::from("test_financial_data.csv"),
        }
    }
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            benchmark: "^GSPC".to_string(),
            default_ticker: "AAPL".to_string(),
            tickers: vec!["AAPL".to_string(), "TSLA".to_string(), "GOOGL".to_string()],
            start_date: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            price_field: PriceField::AdjClose,
            risk_free_rate: 0.02,
            trading_days_per_year: 252,
        }
    }
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ma_short_window: 50,
            ma_long_window: 200,
            volatility_window: 30,
            rsi_period: 14,
            bollinger_window: 20,
            bollinger_std_dev: 2.0,
            ema_short_span: 20,
            ema_long_span: 50,
            drawdown_window: 252,
            histogram_bins: 50,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Rejects values that would make a later stage meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dcf.tax_rate < Decimal::ZERO || self.dcf.tax_rate >= Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "dcf.tax_rate must be in [0, 1), got {}",
                self.dcf.tax_rate
            )));
        }

        if self.market.tickers.is_empty() {
            return Err(ConfigError::ValidationError(
                "market.tickers must list at least one ticker".to_string(),
            ));
        }
        if self.market.start_date >= self.market.end_date {
            return Err(ConfigError::ValidationError(format!(
                "market.start_date ({}) must be before market.end_date ({})",
                self.market.start_date, self.market.end_date
            )));
        }
        if self.market.trading_days_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "market.trading_days_per_year cannot be zero".to_string(),
            ));
        }

        let ind = &self.indicators;
        let windows = [
            ("ma_short_window", ind.ma_short_window),
            ("ma_long_window", ind.ma_long_window),
            ("volatility_window", ind.volatility_window),
            ("rsi_period", ind.rsi_period),
            ("bollinger_window", ind.bollinger_window),
            ("ema_short_span", ind.ema_short_span),
            ("ema_long_span", ind.ema_long_span),
            ("drawdown_window", ind.drawdown_window),
            ("histogram_bins", ind.histogram_bins),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ValidationError(format!(
                "indicators.{name} cannot be zero"
            )));
        }
        if ind.bollinger_std_dev <= 0.0 {
            return Err(ConfigError::ValidationError(
                "indicators.bollinger_std_dev must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
