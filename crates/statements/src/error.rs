use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("Failed to open statements file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Row {row}: missing value for column '{column}'")]
    MissingValue { row: usize, column: String },

    #[error("Row {row}: column '{column}' has non-numeric value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("The statements file contains no data rows")]
    Empty,
}
