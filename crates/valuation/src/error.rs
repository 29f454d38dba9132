use core_types::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Invalid financial data: {0}")]
    Data(String),

    #[error("Invalid assumption: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Calculation error: Division by zero encountered in metric '{0}'")]
    DivisionByZero(String),

    #[error("Calculation error: '{0}' is outside the representable range")]
    Overflow(String),
}

impl ValuationError {
    /// True for degenerate-math failures, as opposed to bad input.
    pub fn is_computation(&self) -> bool {
        matches!(
            self,
            ValuationError::NotEnoughData(_)
                | ValuationError::DivisionByZero(_)
                | ValuationError::Overflow(_)
        )
    }
}
