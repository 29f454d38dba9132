use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Invalid indicator parameter: {0}")]
    Indicator(String),
}

impl From<ta::errors::TaError> for AnalyticsError {
    fn from(err: ta::errors::TaError) -> Self {
        AnalyticsError::Indicator(format!("{err:?}"))
    }
}
