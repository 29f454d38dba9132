use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("The market data provider returned an error: {0}")]
    Provider(String),

    #[error("No price data found for {symbol}")]
    NoData { symbol: String },

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),
}

impl From<yahoo_finance_api::YahooError> for ApiError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        ApiError::Provider(err.to_string())
    }
}
