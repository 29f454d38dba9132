//! # finscope Core Types
//!
//! Layer 0 of the workspace: the plain data records that flow between the loader,
//! the valuation pipeline, the price analytics and the reporter. This crate has no
//! I/O and no knowledge of any other crate in the workspace.

pub mod assumptions;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use assumptions::{
    parse_projection_years, parse_terminal_growth, parse_wacc, ProjectionAssumptions,
};
pub use enums::PriceField;
pub use error::ValidationError;
pub use structs::{
    CashFlowRecord, DcfAnalysis, HistoricalRecord, PriceBar, PriceSeries, ProjectedRecord,
    Projection, ValuationResult,
};
