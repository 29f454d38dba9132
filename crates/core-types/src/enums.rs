use serde::{Deserialize, Serialize};

/// Which price column the analytics run on.
///
/// Adjusted close folds splits and dividends into the history, so it is the
/// default whenever the data source provides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PriceField {
    #[default]
    AdjClose,
    Close,
}

impl PriceField {
    /// The column header used in exported workbooks.
    pub fn label(&self) -> &'static str {
        match self {
            PriceField::AdjClose => "Adj Close",
            PriceField::Close => "Close",
        }
    }
}
