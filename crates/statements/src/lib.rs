//! # finscope Statements
//!
//! The data access layer for historical financial statements. It owns the CSV
//! format: which columns are required, how cells are parsed, and how the
//! synthetic demo dataset is written.
//!
//! ## Public API
//!
//! - `load_statements` / `read_statements`: parse and validate a statements file.
//! - `sample_statements` / `write_sample_statements`: the five-year synthetic dataset.
//! - `StatementError`: the data errors this crate reports.

pub mod error;
pub mod loader;
pub mod sample;

pub use error::StatementError;
pub use loader::{load_statements, read_statements, PERIOD_COLUMN, REQUIRED_COLUMNS};
pub use sample::{sample_statements, write_sample_statements, write_statements};
