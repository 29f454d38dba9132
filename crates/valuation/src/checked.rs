//! Overflow-checked `Decimal` arithmetic. `Decimal`'s operators panic when a
//! result leaves its 96-bit range; these return `ValuationError::Overflow`
//! naming the metric instead.

use crate::error::ValuationError;
use rust_decimal::Decimal;

pub(crate) fn add(a: Decimal, b: Decimal, metric: &str) -> Result<Decimal, ValuationError> {
    a.checked_add(b).ok_or_else(|| overflow(metric))
}

pub(crate) fn sub(a: Decimal, b: Decimal, metric: &str) -> Result<Decimal, ValuationError> {
    a.checked_sub(b).ok_or_else(|| overflow(metric))
}

pub(crate) fn mul(a: Decimal, b: Decimal, metric: &str) -> Result<Decimal, ValuationError> {
    a.checked_mul(b).ok_or_else(|| overflow(metric))
}

/// A zero divisor is `DivisionByZero`; an out-of-range quotient is `Overflow`.
pub(crate) fn div(a: Decimal, b: Decimal, metric: &str) -> Result<Decimal, ValuationError> {
    if b.is_zero() {
        return Err(ValuationError::DivisionByZero(metric.to_string()));
    }
    a.checked_div(b).ok_or_else(|| overflow(metric))
}

fn overflow(metric: &str) -> ValuationError {
    ValuationError::Overflow(metric.to_string())
}
