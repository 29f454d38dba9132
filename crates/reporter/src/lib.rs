//! # finscope Reporter
//!
//! Turns finished analyses into artifacts: PNG charts rendered with
//! `plotters`, the DCF PDF report, Excel workbooks for the stock tools, and
//! console tables. Nothing here computes figures; it only lays them out.

pub mod charts;
pub mod console;
pub mod error;
pub mod format;
pub mod pdf;
pub mod workbook;

pub use charts::{ChartImage, comparison_charts, fcf_chart, growth_chart, stock_charts};
pub use error::ReportError;
pub use format::{format_currency, format_percent};
pub use pdf::write_dcf_report;
pub use workbook::{stock_workbook_name, write_comparison_workbook, write_stock_workbook};
