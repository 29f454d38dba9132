//! # finscope Valuation Engine
//!
//! Discounted cash flow valuation as an explicit, immutable pipeline:
//!
//! ```text
//! HistoricalRecord -> fcf -> CashFlowRecord -> projector -> Projection -> valuator -> ValuationResult
//! ```
//!
//! Each stage is a free function that takes its predecessor's output by reference
//! and returns a new value or a `ValuationError`. `DcfEngine` strings them
//! together for callers that want the whole run.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** a pure logic crate with no I/O. It depends only on `core-types`.
//! - **Exact arithmetic:** amounts and rates are `Decimal`, so the same inputs
//!   always reproduce the same totals.

mod checked;
pub mod engine;
pub mod error;
pub mod fcf;
pub mod projector;
pub mod valuator;

pub use engine::DcfEngine;
pub use error::ValuationError;
pub use fcf::{calculate_free_cash_flow, DEFAULT_TAX_RATE};
pub use projector::{growth_glide_path, historical_growth_rate, project};
pub use valuator::value;
