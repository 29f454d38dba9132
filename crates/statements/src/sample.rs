use crate::error::StatementError;
use crate::loader::{PERIOD_COLUMN, REQUIRED_COLUMNS};
use core_types::HistoricalRecord;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const FIRST_YEAR: i32 = 2020;
const YEARS: usize = 5;

/// Five years (2020-2024) of synthetic statements with steady growth:
/// revenue +10%/yr from 1,000,000, operating expenses +8%/yr from 800,000,
/// depreciation and capex +5%/yr, working capital changes +3%/yr.
pub fn sample_statements() -> Vec<HistoricalRecord> {
    let mut revenue = dec!(1000000);
    let mut opex = dec!(800000);
    let mut depreciation = dec!(50000);
    let mut capex = dec!(70000);
    let mut working_capital = dec!(20000);

    let mut records = Vec::with_capacity(YEARS);
    for (offset, year) in (FIRST_YEAR..).take(YEARS).enumerate() {
        if offset > 0 {
            revenue *= dec!(1.10);
            opex *= dec!(1.08);
            depreciation *= dec!(1.05);
            capex *= dec!(1.05);
            working_capital *= dec!(1.03);
        }
        records.push(HistoricalRecord {
            period: Some(year.to_string()),
            revenue,
            operating_expenses: opex,
            depreciation,
            capex,
            change_in_working_capital: working_capital,
        });
    }
    records
}

/// Writes records in the same layout `read_statements` expects.
pub fn write_statements<W: Write>(
    writer: W,
    records: &[HistoricalRecord],
) -> Result<(), StatementError> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec![PERIOD_COLUMN];
    header.extend(REQUIRED_COLUMNS);
    writer.write_record(&header)?;

    for record in records {
        let cells: [String; 6] = [
            record.period.clone().unwrap_or_default(),
            fmt(record.revenue),
            fmt(record.operating_expenses),
            fmt(record.depreciation),
            fmt(record.capex),
            fmt(record.change_in_working_capital),
        ];
        writer.write_record(&cells)?;
    }

    writer.flush().map_err(|e| StatementError::Csv(e.into()))?;
    Ok(())
}

/// Writes the synthetic dataset to `path`.
pub fn write_sample_statements(path: impl AsRef<Path>) -> Result<(), StatementError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| StatementError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_statements(file, &sample_statements())?;
    tracing::info!(path = %path.display(), "Test data created successfully.");
    Ok(())
}

fn fmt(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_statements, read_statements};

    #[test]
    fn sample_compounds_each_line_item() {
        let records = sample_statements();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].period.as_deref(), Some("2020"));
        assert_eq!(records[4].period.as_deref(), Some("2024"));
        assert_eq!(records[1].revenue, dec!(1100000));
        assert_eq!(records[4].revenue, dec!(1464100));
        assert_eq!(records[2].operating_expenses, dec!(933120));
        assert_eq!(records[1].change_in_working_capital, dec!(20600));
    }

    #[test]
    fn written_sample_loads_back_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_financial_data.csv");

        write_sample_statements(&path).unwrap();
        assert_eq!(load_statements(&path).unwrap(), sample_statements());
    }

    #[test]
    fn written_header_lists_period_first() {
        let mut buffer = Vec::new();
        write_statements(&mut buffer, &sample_statements()[..1]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with(
            "Year,Revenue,Operating_Expenses,Depreciation,Capex,Change_Working_Capital\n2020,1000000,"
        ));
        assert_eq!(read_statements(text.as_bytes()).unwrap().len(), 1);
    }
}
