use crate::error::AnalyticsError;
use crate::indicators;
use crate::report::{AnalysisDepth, AnalysisRow, PerformanceSummary, StockAnalysis};
use configuration::{IndicatorSettings, MarketSettings};
use core_types::{PriceField, PriceSeries};

/// A stateless calculator for deriving indicators and statistics from a daily
/// price history.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    windows: IndicatorSettings,
    price_field: PriceField,
    risk_free_rate: f64,
    trading_days_per_year: u32,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(IndicatorSettings::default(), &MarketSettings::default())
    }
}

/// Columns shared by both depths of analysis.
struct BasicColumns {
    prices: Vec<f64>,
    daily_return: Vec<Option<f64>>,
    ma_short: Vec<Option<f64>>,
    ma_long: Vec<Option<f64>>,
    volatility: Vec<Option<f64>>,
}

impl AnalyticsEngine {
    pub fn new(windows: IndicatorSettings, market: &MarketSettings) -> Self {
        Self {
            windows,
            price_field: market.price_field,
            risk_free_rate: market.risk_free_rate,
            trading_days_per_year: market.trading_days_per_year,
        }
    }

    pub fn windows(&self) -> &IndicatorSettings {
        &self.windows
    }

    /// The full single-stock analysis.
    ///
    /// # Arguments
    ///
    /// * `series` - The stock's daily bars, oldest first.
    /// * `benchmark` - The market index used for beta. Its dates need not match
    ///   the stock's; only overlapping days enter the covariance.
    ///
    /// # Returns
    ///
    /// A `StockAnalysis` with every indicator column filled, or
    /// `AnalyticsError::NotEnoughData` for an empty series.
    pub fn analyze(
        &self,
        series: &PriceSeries,
        benchmark: &PriceSeries,
    ) -> Result<StockAnalysis, AnalyticsError> {
        let basic = self.basic_columns(series)?;
        let w = &self.windows;
        let prices = &basic.prices;

        let rsi = indicators::rsi(prices, w.rsi_period)?;
        let (upper_band, lower_band) =
            indicators::bollinger_bands(prices, w.bollinger_window, w.bollinger_std_dev)?;
        let ema_short = indicators::ema(prices, w.ema_short_span)?;
        let ema_long = indicators::ema(prices, w.ema_long_span)?;
        let max_drawdown = indicators::rolling_max_drawdown(prices, w.drawdown_window)?;

        let benchmark_returns: Vec<_> = benchmark
            .dates()
            .into_iter()
            .zip(indicators::pct_change(&benchmark.prices(self.price_field)))
            .collect();
        let stock_returns: Vec<_> = series
            .dates()
            .into_iter()
            .zip(basic.daily_return.iter().copied())
            .collect();
        let beta = indicators::beta(&stock_returns, &benchmark_returns);
        if beta.is_none() {
            tracing::warn!(
                symbol = %series.symbol,
                benchmark = %benchmark.symbol,
                "Beta is undefined: no overlapping returns or a flat benchmark."
            );
        }

        let excess = indicators::excess_returns(
            &basic.daily_return,
            self.risk_free_rate,
            self.trading_days_per_year,
        );
        let sharpe_ratio = indicators::sharpe_ratio(&excess);

        let mut rows = self.rows(series, &basic);
        for (i, row) in rows.iter_mut().enumerate() {
            row.rsi = rsi[i];
            row.upper_band = upper_band[i];
            row.lower_band = lower_band[i];
            row.ema_short = ema_short[i];
            row.ema_long = ema_long[i];
            row.max_drawdown = max_drawdown[i];
            row.beta = beta;
            row.excess_return = excess[i];
        }

        let mut summary = self.summary(series, prices);
        summary.beta = beta;
        summary.sharpe_ratio = sharpe_ratio;

        tracing::info!(
            symbol = %series.symbol,
            rows = rows.len(),
            beta = ?beta,
            sharpe_ratio = ?sharpe_ratio,
            "Stock analysis complete."
        );

        Ok(self.assemble(series, AnalysisDepth::Full, rows, summary))
    }

    /// Returns, moving averages and volatility only. No benchmark is needed.
    pub fn analyze_basic(&self, series: &PriceSeries) -> Result<StockAnalysis, AnalyticsError> {
        let basic = self.basic_columns(series)?;
        let rows = self.rows(series, &basic);
        let summary = self.summary(series, &basic.prices);

        tracing::debug!(symbol = %series.symbol, rows = rows.len(), "Basic analysis complete.");
        Ok(self.assemble(series, AnalysisDepth::Basic, rows, summary))
    }

    fn basic_columns(&self, series: &PriceSeries) -> Result<BasicColumns, AnalyticsError> {
        if series.is_empty() {
            return Err(AnalyticsError::NotEnoughData(format!(
                "no price history for {}",
                series.symbol
            )));
        }

        let w = &self.windows;
        let prices = series.prices(self.price_field);
        let daily_return = indicators::pct_change(&prices);
        Ok(BasicColumns {
            ma_short: indicators::rolling_mean(&prices, w.ma_short_window)?,
            ma_long: indicators::rolling_mean(&prices, w.ma_long_window)?,
            volatility: indicators::rolling_std(&daily_return, w.volatility_window),
            daily_return,
            prices,
        })
    }

    fn rows(&self, series: &PriceSeries, basic: &BasicColumns) -> Vec<AnalysisRow> {
        series
            .bars
            .iter()
            .enumerate()
            .map(|(i, bar)| AnalysisRow {
                bar: bar.clone(),
                price: basic.prices[i],
                daily_return: basic.daily_return[i],
                ma_short: basic.ma_short[i],
                ma_long: basic.ma_long[i],
                volatility: basic.volatility[i],
                rsi: None,
                upper_band: None,
                lower_band: None,
                ema_short: None,
                ema_long: None,
                max_drawdown: None,
                beta: None,
                excess_return: None,
            })
            .collect()
    }

    /// Assumes a non-empty series; `basic_columns` has already checked.
    fn summary(&self, series: &PriceSeries, prices: &[f64]) -> PerformanceSummary {
        let first = prices.first().copied().unwrap_or_default();
        let last = prices.last().copied().unwrap_or_default();
        let dates = series.dates();

        PerformanceSummary {
            symbol: series.symbol.clone(),
            first_date: dates.first().copied().unwrap_or_default(),
            last_date: dates.last().copied().unwrap_or_default(),
            observations: prices.len(),
            last_price: last,
            total_return: (first != 0.0).then(|| last / first - 1.0),
            max_drawdown: indicators::drawdown(prices)
                .into_iter()
                .fold(0.0, f64::min),
            beta: None,
            sharpe_ratio: None,
        }
    }

    fn assemble(
        &self,
        series: &PriceSeries,
        depth: AnalysisDepth,
        rows: Vec<AnalysisRow>,
        summary: PerformanceSummary,
    ) -> StockAnalysis {
        StockAnalysis {
            symbol: series.symbol.clone(),
            price_field: self.price_field,
            depth,
            windows: self.windows.clone(),
            rows,
            summary,
        }
    }
}
