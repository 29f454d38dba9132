use crate::checked;
use crate::error::ValuationError;
use core_types::{CashFlowRecord, ProjectedRecord, Projection, ProjectionAssumptions};
use rust_decimal::Decimal;

/// Mean period-over-period revenue growth. The first period contributes no
/// observation, so at least two periods are required.
pub fn historical_growth_rate(history: &[CashFlowRecord]) -> Result<Decimal, ValuationError> {
    if history.len() < 2 {
        return Err(ValuationError::NotEnoughData(format!(
            "revenue growth needs at least 2 periods, got {}",
            history.len()
        )));
    }

    let mut total = Decimal::ZERO;
    for pair in history.windows(2) {
        let (previous, current) = (pair[0].record.revenue, pair[1].record.revenue);
        let ratio = checked::div(current, previous, "revenue growth")?;
        let growth = checked::sub(ratio, Decimal::ONE, "revenue growth")?;
        total = checked::add(total, growth, "revenue growth")?;
    }

    checked::div(total, Decimal::from(history.len() - 1), "revenue growth")
}

/// `years` evenly spaced growth rates from `start` to `end`, both included.
///
/// A single-year horizon yields only `start`.
pub fn growth_glide_path(
    start: Decimal,
    end: Decimal,
    years: u32,
) -> Result<Vec<Decimal>, ValuationError> {
    const METRIC: &str = "growth glide path";
    match years {
        0 => Ok(Vec::new()),
        1 => Ok(vec![start]),
        n => {
            let steps = Decimal::from(n - 1);
            let span = checked::sub(end, start, METRIC)?;
            (0..n)
                .map(|i| {
                    let offset = checked::mul(span, Decimal::from(i), METRIC)?;
                    checked::add(start, checked::div(offset, steps, METRIC)?, METRIC)
                })
                .collect()
        }
    }
}

/// Mean EBIT margin across the historical periods.
fn average_margin(history: &[CashFlowRecord]) -> Result<Decimal, ValuationError> {
    if history.is_empty() {
        return Err(ValuationError::NotEnoughData(
            "EBIT margin needs at least 1 period".to_string(),
        ));
    }

    let mut total = Decimal::ZERO;
    for row in history {
        let margin = checked::div(row.ebit, row.record.revenue, "EBIT margin")?;
        total = checked::add(total, margin, "EBIT margin")?;
    }
    checked::div(total, Decimal::from(history.len()), "EBIT margin")
}

/// Extrapolates revenue, EBIT and free cash flow over the projection horizon.
///
/// Revenue compounds from the last historical period along the growth glide
/// path, EBIT applies the average historical margin, and projected FCF is
/// after-tax EBIT with no reinvestment adjustments.
pub fn project(
    history: &[CashFlowRecord],
    assumptions: &ProjectionAssumptions,
    tax_rate: Decimal,
) -> Result<Projection, ValuationError> {
    let historical_growth = historical_growth_rate(history)?;
    let average_margin = average_margin(history)?;
    let growth_rates = growth_glide_path(
        historical_growth,
        assumptions.terminal_growth,
        assumptions.projection_years,
    )?;

    let base_revenue = history
        .last()
        .map(|row| row.record.revenue)
        .ok_or_else(|| ValuationError::NotEnoughData("no base period".to_string()))?;
    let retained = Decimal::ONE - tax_rate;

    let mut cumulative = Decimal::ONE;
    let mut records = Vec::with_capacity(growth_rates.len());
    for (&growth_rate, year) in growth_rates.iter().zip(1u32..) {
        let factor = checked::add(Decimal::ONE, growth_rate, "projected revenue")?;
        cumulative = checked::mul(cumulative, factor, "projected revenue")?;
        let revenue = checked::mul(base_revenue, cumulative, "projected revenue")?;
        let ebit = checked::mul(revenue, average_margin, "projected EBIT")?;
        records.push(ProjectedRecord {
            year,
            growth_rate,
            revenue,
            ebit,
            fcf: checked::mul(ebit, retained, "projected FCF")?,
        });
    }

    tracing::debug!(
        %historical_growth,
        %average_margin,
        years = assumptions.projection_years,
        "Projected financials."
    );

    Ok(Projection {
        historical_growth,
        average_margin,
        growth_rates,
        records,
    })
}
