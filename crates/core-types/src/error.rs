use thiserror::Error;

/// Rejection reasons for user-supplied valuation parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid number")]
    NotANumber(String),

    #[error("{name} should be between {bounds}")]
    OutOfRange {
        name: &'static str,
        bounds: &'static str,
        value: String,
    },

    #[error("WACC ({wacc}) must exceed the terminal growth rate ({terminal_growth})")]
    RateSpread {
        wacc: String,
        terminal_growth: String,
    },
}
