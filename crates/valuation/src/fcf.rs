use crate::checked;
use crate::error::ValuationError;
use core_types::{CashFlowRecord, HistoricalRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// US federal corporate rate.
pub const DEFAULT_TAX_RATE: Decimal = dec!(0.21);

/// Derives EBIT, NOPAT and free cash flow for every historical period.
///
/// ```text
/// EBIT  = Revenue - OperatingExpenses
/// NOPAT = EBIT * (1 - tax_rate)
/// FCF   = NOPAT + Depreciation - Capex - ChangeInWorkingCapital
/// ```
pub fn calculate_free_cash_flow(
    records: &[HistoricalRecord],
    tax_rate: Decimal,
) -> Result<Vec<CashFlowRecord>, ValuationError> {
    if records.is_empty() {
        return Err(ValuationError::Data(
            "no historical records to derive free cash flow from".to_string(),
        ));
    }

    let retained = Decimal::ONE - tax_rate;
    let derived = records
        .iter()
        .map(|record| {
            let ebit = checked::sub(record.revenue, record.operating_expenses, "EBIT")?;
            let nopat = checked::mul(ebit, retained, "NOPAT")?;
            let fcf = checked::add(nopat, record.depreciation, "FCF")
                .and_then(|v| checked::sub(v, record.capex, "FCF"))
                .and_then(|v| checked::sub(v, record.change_in_working_capital, "FCF"))?;
            Ok(CashFlowRecord {
                record: record.clone(),
                ebit,
                nopat,
                fcf,
            })
        })
        .collect::<Result<Vec<_>, ValuationError>>()?;

    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use statements::sample_statements;

    #[test]
    fn identities_hold_for_every_row() {
        let history = calculate_free_cash_flow(&sample_statements(), DEFAULT_TAX_RATE).unwrap();
        assert_eq!(history.len(), 5);

        for row in &history {
            let r = &row.record;
            assert_eq!(row.ebit, r.revenue - r.operating_expenses);
            assert_eq!(row.nopat, row.ebit * dec!(0.79));
            assert_eq!(
                row.fcf,
                row.ebit * dec!(0.79) + r.depreciation - r.capex - r.change_in_working_capital
            );
        }
    }

    #[test]
    fn first_sample_year_matches_hand_calculation() {
        let history = calculate_free_cash_flow(&sample_statements(), DEFAULT_TAX_RATE).unwrap();
        // (1,000,000 - 800,000) * 0.79 + 50,000 - 70,000 - 20,000
        assert_eq!(history[0].ebit, dec!(200000));
        assert_eq!(history[0].nopat, dec!(158000));
        assert_eq!(history[0].fcf, dec!(118000));
    }

    #[test]
    fn negative_ebit_flows_through() {
        let record = HistoricalRecord {
            period: None,
            revenue: dec!(100),
            operating_expenses: dec!(150),
            depreciation: dec!(10),
            capex: dec!(5),
            change_in_working_capital: dec!(0),
        };
        let history = calculate_free_cash_flow(&[record], dec!(0.21)).unwrap();
        assert_eq!(history[0].ebit, dec!(-50));
        assert_eq!(history[0].fcf, dec!(-34.5));
    }

    #[test]
    fn empty_history_is_a_data_error() {
        let err = calculate_free_cash_flow(&[], DEFAULT_TAX_RATE).unwrap_err();
        assert!(matches!(err, ValuationError::Data(_)));
        assert!(!err.is_computation());
    }

    #[test]
    fn out_of_range_amounts_are_an_overflow() {
        let record = HistoricalRecord {
            period: None,
            revenue: Decimal::MAX,
            operating_expenses: Decimal::MIN,
            depreciation: dec!(0),
            capex: dec!(0),
            change_in_working_capital: dec!(0),
        };
        let err = calculate_free_cash_flow(&[record], DEFAULT_TAX_RATE).unwrap_err();
        assert!(matches!(err, ValuationError::Overflow(ref metric) if metric == "EBIT"));
    }
}
