use crate::error::ValuationError;
use crate::fcf::{DEFAULT_TAX_RATE, calculate_free_cash_flow};
use crate::projector::project;
use crate::valuator::value;
use core_types::{DcfAnalysis, HistoricalRecord, ProjectionAssumptions};
use rust_decimal::Decimal;

/// A stateless runner for the full discounted cash flow pipeline.
#[derive(Debug, Clone)]
pub struct DcfEngine {
    tax_rate: Decimal,
    enforce_rate_spread: bool,
}

impl Default for DcfEngine {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            enforce_rate_spread: true,
        }
    }
}

impl DcfEngine {
    /// # Arguments
    ///
    /// * `tax_rate` - Flat corporate tax rate applied to EBIT.
    /// * `enforce_rate_spread` - Reject assumptions where WACC does not exceed
    ///   terminal growth before any work is done. When off, only the exact
    ///   WACC == growth case fails (as a division by zero) and a negative
    ///   spread produces a negative terminal value.
    pub fn new(tax_rate: Decimal, enforce_rate_spread: bool) -> Self {
        Self {
            tax_rate,
            enforce_rate_spread,
        }
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Runs FCF derivation, projection and valuation in order.
    ///
    /// # Returns
    ///
    /// A `DcfAnalysis` bundling every intermediate table with the valuation, or
    /// the first `ValuationError` raised along the way.
    pub fn run(
        &self,
        records: &[HistoricalRecord],
        assumptions: &ProjectionAssumptions,
    ) -> Result<DcfAnalysis, ValuationError> {
        if self.enforce_rate_spread {
            assumptions.check_rate_spread()?;
        }

        let history = calculate_free_cash_flow(records, self.tax_rate)?;
        let projection = project(&history, assumptions, self.tax_rate)?;
        let valuation = value(&projection.records, assumptions)?;

        tracing::info!(
            wacc = %assumptions.wacc,
            terminal_growth = %assumptions.terminal_growth,
            years = assumptions.projection_years,
            total_value = %valuation.total_value.round_dp(2),
            "DCF valuation complete."
        );

        Ok(DcfAnalysis {
            assumptions: assumptions.clone(),
            history,
            projection,
            valuation,
        })
    }
}
