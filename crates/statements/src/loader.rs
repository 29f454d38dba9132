use crate::error::StatementError;
use core_types::HistoricalRecord;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Column names every statements file must carry. Matching is case-sensitive.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Revenue",
    "Operating_Expenses",
    "Depreciation",
    "Capex",
    "Change_Working_Capital",
];

/// Optional column used as the period label.
pub const PERIOD_COLUMN: &str = "Year";

/// Loads and validates a statements CSV from disk.
pub fn load_statements(path: impl AsRef<Path>) -> Result<Vec<HistoricalRecord>, StatementError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| StatementError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let records = read_statements(file)?;
    tracing::info!(
        path = %path.display(),
        periods = records.len(),
        "Financial statements loaded successfully."
    );
    Ok(records)
}

/// Parses statements from any reader.
///
/// Every required column must exist and every one of their cells must hold a
/// number; other columns are ignored.
pub fn read_statements<R: Read>(reader: R) -> Result<Vec<HistoricalRecord>, StatementError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column_index = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| column_index(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StatementError::MissingColumns(missing));
    }

    // All required columns are present, so these lookups cannot miss.
    let [revenue, opex, depreciation, capex, working_capital] =
        REQUIRED_COLUMNS.map(|name| column_index(name).unwrap_or_default());
    let period = column_index(PERIOD_COLUMN);

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let line = i + 1;

        records.push(HistoricalRecord {
            period: period
                .and_then(|idx| row.get(idx))
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            revenue: parse_cell(&row, revenue, "Revenue", line)?,
            operating_expenses: parse_cell(&row, opex, "Operating_Expenses", line)?,
            depreciation: parse_cell(&row, depreciation, "Depreciation", line)?,
            capex: parse_cell(&row, capex, "Capex", line)?,
            change_in_working_capital: parse_cell(
                &row,
                working_capital,
                "Change_Working_Capital",
                line,
            )?,
        });
    }

    if records.is_empty() {
        return Err(StatementError::Empty);
    }
    Ok(records)
}

fn parse_cell(
    row: &StringRecord,
    index: usize,
    column: &str,
    line: usize,
) -> Result<Decimal, StatementError> {
    let raw = row.get(index).unwrap_or_default();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return Err(StatementError::MissingValue {
            row: line,
            column: column.to_string(),
        });
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| StatementError::InvalidValue {
            row: line,
            column: column.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "Year,Revenue,Operating_Expenses,Depreciation,Capex,Change_Working_Capital";

    #[test]
    fn reads_all_rows_in_order() {
        let csv = format!(
            "{HEADER}\n2020,1000000,800000,50000,70000,20000\n2021,1100000.0000000002,864000,52500,73500,20600\n"
        );
        let records = read_statements(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].period.as_deref(), Some("2020"));
        assert_eq!(records[0].revenue, dec!(1000000));
        assert_eq!(records[1].revenue, dec!(1100000.0000000002));
        assert_eq!(records[1].change_in_working_capital, dec!(20600));
    }

    #[test]
    fn period_column_is_optional_and_extra_columns_are_ignored() {
        let csv = "Notes,Revenue,Operating_Expenses,Depreciation,Capex,Change_Working_Capital\n\
                   audited,10,5,1,2,1\n";
        let records = read_statements(csv.as_bytes()).unwrap();
        assert_eq!(records[0].period, None);
        assert_eq!(records[0].operating_expenses, dec!(5));
    }

    #[test]
    fn every_missing_column_is_reported() {
        let csv = "Year,Revenue,Depreciation,Capex\n2020,1,2,3\n";
        let err = read_statements(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required columns: Operating_Expenses, Change_Working_Capital"
        );
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let csv = "revenue,Operating_Expenses,Depreciation,Capex,Change_Working_Capital\n1,2,3,4,5\n";
        let err = read_statements(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, StatementError::MissingColumns(ref cols) if cols == &["Revenue"]));
    }

    #[test]
    fn blank_cell_is_a_missing_value() {
        let csv = format!("{HEADER}\n2020,100,80,5,7,2\n2021,110,,5,7,2\n");
        let err = read_statements(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            StatementError::MissingValue { row: 2, ref column } if column == "Operating_Expenses"
        ));
    }

    #[test]
    fn text_cell_is_an_invalid_value() {
        let csv = format!("{HEADER}\n2020,100,80,five,7,2\n");
        let err = read_statements(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Row 1: column 'Depreciation' has non-numeric value 'five'"
        );
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = read_statements(format!("{HEADER}\n").as_bytes()).unwrap_err();
        assert!(matches!(err, StatementError::Empty));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_statements("/no/such/dir/statements.csv").unwrap_err();
        assert!(matches!(err, StatementError::Io { .. }));
    }
}
