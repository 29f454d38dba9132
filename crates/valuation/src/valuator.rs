use crate::checked;
use crate::error::ValuationError;
use core_types::{ProjectedRecord, ProjectionAssumptions, ValuationResult};
use rust_decimal::Decimal;

/// Discounts projected free cash flows and a perpetual-growth terminal value
/// back to today at the WACC.
///
/// ```text
/// PV_FCF           = sum(FCF[y] / (1 + WACC)^y)
/// TerminalValue    = FCF[N] * (1 + g) / (WACC - g)
/// PV_TerminalValue = TerminalValue / (1 + WACC)^N
/// TotalValue       = PV_FCF + PV_TerminalValue
/// ```
pub fn value(
    projected: &[ProjectedRecord],
    assumptions: &ProjectionAssumptions,
) -> Result<ValuationResult, ValuationError> {
    let last = projected.last().ok_or_else(|| {
        ValuationError::NotEnoughData("no projected cash flows to discount".to_string())
    })?;

    let wacc = assumptions.wacc;
    let spread = checked::sub(wacc, assumptions.terminal_growth, "terminal value")?;

    let mut pv_fcf = Decimal::ZERO;
    for row in projected {
        let discounted = checked::div(row.fcf, discount_factor(wacc, row.year)?, "PV of FCF")?;
        pv_fcf = checked::add(pv_fcf, discounted, "PV of FCF")?;
    }

    let terminal_fcf = checked::mul(
        last.fcf,
        Decimal::ONE + assumptions.terminal_growth,
        "terminal FCF",
    )?;
    let terminal_value = checked::div(terminal_fcf, spread, "terminal value")?;
    let pv_terminal_value = checked::div(
        terminal_value,
        discount_factor(wacc, last.year)?,
        "PV of terminal value",
    )?;

    Ok(ValuationResult {
        pv_fcf,
        terminal_value,
        pv_terminal_value,
        total_value: checked::add(pv_fcf, pv_terminal_value, "total value")?,
    })
}

/// `(1 + rate)^years`, by repeated multiplication so it stays exact.
fn discount_factor(rate: Decimal, years: u32) -> Result<Decimal, ValuationError> {
    let base = Decimal::ONE + rate;
    (0..years).try_fold(Decimal::ONE, |acc, _| checked::mul(acc, base, "discount factor"))
}
