//! # finscope Market Data Client
//!
//! The `ApiClient` trait is the contract the stock commands fetch prices
//! through, so tests can swap the live provider for an in-memory one.

pub mod error;
pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceSeries;

// --- Public API ---
pub use error::ApiError;
pub use yahoo::YahooClient;

/// The generic, abstract interface for a daily market data provider.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetches daily bars for `symbol` with `start <= date < end`, oldest first.
    ///
    /// An empty history is an `ApiError::NoData`, never an empty series.
    async fn fetch_price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError>;
}
