//! # finscope Analytics Engine
//!
//! Daily price-series analysis: returns, moving averages, volatility, RSI,
//! Bollinger bands, EMAs, drawdown, beta against a benchmark and the Sharpe
//! ratio.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` and is handed its windows from `configuration`.
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator. It takes
//!   a `PriceSeries` as input and produces a `StockAnalysis` as output.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `StockAnalysis`: Per-day indicator rows plus a `PerformanceSummary`.
//! - `indicators`: The column functions the engine is built from.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod indicators;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use indicators::{histogram, HistogramBin};
pub use report::{AnalysisColumn, AnalysisDepth, AnalysisRow, PerformanceSummary, StockAnalysis};
