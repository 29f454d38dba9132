//! Range-checked valuation parameters.
//!
//! The `parse_*` functions turn raw user text into typed values or a
//! [`ValidationError`] explaining the rejection. They never loop or prompt; the
//! CLI layer decides whether to ask again.

use crate::error::ValidationError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MIN_PROJECTION_YEARS: u32 = 1;
pub const MAX_PROJECTION_YEARS: u32 = 10;

/// The user's view of the future: discount rate, long-run growth and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionAssumptions {
    /// Weighted average cost of capital, exclusive range (0, 1).
    pub wacc: Decimal,
    /// Perpetual growth rate after the horizon, exclusive range (-0.1, 0.1).
    pub terminal_growth: Decimal,
    /// Number of explicitly projected years, inclusive range [1, 10].
    pub projection_years: u32,
}

impl ProjectionAssumptions {
    /// Builds a set of assumptions, checking each parameter's range.
    ///
    /// The WACC > terminal growth invariant is checked separately by
    /// [`ProjectionAssumptions::check_rate_spread`] so callers can opt out of it.
    pub fn new(
        wacc: Decimal,
        terminal_growth: Decimal,
        projection_years: u32,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            wacc: validate_wacc(wacc)?,
            terminal_growth: validate_terminal_growth(terminal_growth)?,
            projection_years: validate_projection_years(i64::from(projection_years))?,
        })
    }

    /// Fails unless the discount rate exceeds the terminal growth rate.
    pub fn check_rate_spread(&self) -> Result<(), ValidationError> {
        if self.wacc > self.terminal_growth {
            Ok(())
        } else {
            Err(ValidationError::RateSpread {
                wacc: self.wacc.to_string(),
                terminal_growth: self.terminal_growth.to_string(),
            })
        }
    }
}

pub fn validate_wacc(value: Decimal) -> Result<Decimal, ValidationError> {
    if value > Decimal::ZERO && value < Decimal::ONE {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            name: "WACC",
            bounds: "0 and 1",
            value: value.to_string(),
        })
    }
}

pub fn validate_terminal_growth(value: Decimal) -> Result<Decimal, ValidationError> {
    if value > dec!(-0.1) && value < dec!(0.1) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            name: "Terminal growth rate",
            bounds: "-0.1 and 0.1",
            value: value.to_string(),
        })
    }
}

pub fn validate_projection_years(value: i64) -> Result<u32, ValidationError> {
    match u32::try_from(value) {
        Ok(years) if (MIN_PROJECTION_YEARS..=MAX_PROJECTION_YEARS).contains(&years) => Ok(years),
        _ => Err(ValidationError::OutOfRange {
            name: "Projection years",
            bounds: "1 and 10",
            value: value.to_string(),
        }),
    }
}

/// Parses a WACC given as a decimal fraction, e.g. `0.10` for 10%.
pub fn parse_wacc(input: &str) -> Result<Decimal, ValidationError> {
    validate_wacc(parse_decimal(input)?)
}

/// Parses a terminal growth rate given as a decimal fraction.
pub fn parse_terminal_growth(input: &str) -> Result<Decimal, ValidationError> {
    validate_terminal_growth(parse_decimal(input)?)
}

/// Parses a whole number of projection years.
pub fn parse_projection_years(input: &str) -> Result<u32, ValidationError> {
    let years = input
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber(input.trim().to_string()))?;
    validate_projection_years(years)
}

fn parse_decimal(input: &str) -> Result<Decimal, ValidationError> {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))
}
