use crate::ApiClient;
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use core_types::{PriceBar, PriceSeries};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// A concrete implementation of the `ApiClient` for Yahoo Finance daily history.
pub struct YahooClient {
    connector: yahoo::YahooConnector,
}

impl YahooClient {
    pub fn new() -> Result<Self, ApiError> {
        Ok(Self {
            connector: yahoo::YahooConnector::new()?,
        })
    }
}

#[async_trait]
impl ApiClient for YahooClient {
    async fn fetch_price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        tracing::debug!(symbol, %start, %end, "Requesting quote history.");

        let response = self
            .connector
            .get_quote_history(symbol, to_offset_datetime(start)?, to_offset_datetime(end)?)
            .await?;
        let quotes = response.quotes()?;

        let bars = quotes
            .iter()
            .map(to_bar)
            .collect::<Result<Vec<_>, _>>()?;
        let series = PriceSeries::new(symbol, within(bars, start, end));

        if series.is_empty() {
            return Err(ApiError::NoData {
                symbol: symbol.to_string(),
            });
        }

        tracing::info!(symbol, bars = series.len(), "Fetched price history.");
        Ok(series)
    }
}

fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, ApiError> {
    let timestamp = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| ApiError::InvalidData(format!("Invalid date {date}: {e}")))
}

fn to_bar(quote: &yahoo::Quote) -> Result<PriceBar, ApiError> {
    let timestamp = quote.timestamp as i64;
    let date = DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| ApiError::InvalidData(format!("Invalid quote timestamp: {timestamp}")))?;

    Ok(PriceBar {
        date,
        open: quote.open,
        high: quote.high,
        low: quote.low,
        close: quote.close,
        adj_close: quote.adjclose,
        volume: quote.volume,
    })
}

/// The provider may pad the range; keep `[start, end)` only.
fn within(bars: Vec<PriceBar>, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    bars.into_iter()
        .filter(|bar| bar.date >= start && bar.date < end)
        .collect()
}
