//! Handlers for each subcommand. `main` only parses and dispatches.

pub mod compare;
pub mod dcf;
pub mod stock;

use analytics::AnalyticsEngine;
use configuration::Config;
use core_types::PriceField;
use reporter::{ChartImage, ReportError};

/// Runs a chart renderer, logging and swallowing its failure so the report or
/// workbook is still written, without charts.
pub(crate) fn render_charts<F>(render: F) -> Vec<ChartImage>
where
    F: FnOnce() -> Result<Vec<ChartImage>, ReportError>,
{
    match render() {
        Ok(charts) => charts,
        Err(e) => {
            tracing::warn!(error = %e, "Chart rendering failed; continuing without charts.");
            Vec::new()
        }
    }
}

/// The analytics engine for the configured windows, optionally overriding the
/// price column.
pub(crate) fn analytics_engine(config: &Config, price_field: Option<PriceField>) -> AnalyticsEngine {
    let mut market = config.market.clone();
    if let Some(field) = price_field {
        market.price_field = field;
    }
    AnalyticsEngine::new(config.indicators.clone(), &market)
}

#[cfg(test)]
pub(crate) mod testing {
    use api_client::{ApiClient, ApiError};
    use async_trait::async_trait;
    use chrono::{Days, NaiveDate};
    use configuration::Config;
    use core_types::{PriceBar, PriceSeries};
    use std::path::Path;

    /// Serves a deterministic series for every symbol except those listed as
    /// failing.
    pub struct StubClient {
        pub failing: Vec<&'static str>,
    }

    #[async_trait]
    impl ApiClient for StubClient {
        async fn fetch_price_history(
            &self,
            symbol: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<PriceSeries, ApiError> {
            if self.failing.contains(&symbol) {
                return Err(ApiError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            let seed = symbol.len() as f64;
            let bars = (0..80u64)
                .map(|i| {
                    let p = 50.0 * seed + (i as f64 * 0.3 + seed).sin() * 4.0 + i as f64 * 0.2;
                    PriceBar {
                        date: start + Days::new(i),
                        open: p,
                        high: p + 1.0,
                        low: p - 1.0,
                        close: p,
                        adj_close: p,
                        volume: 10_000 + i,
                    }
                })
                .collect();
            Ok(PriceSeries::new(symbol, bars))
        }
    }

    pub fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.output.directory = dir.join("out");
        config
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
