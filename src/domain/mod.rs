//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input tables (`SalesRecord`, `StoreRecord`, `HolidayEvent`)
//! - the derived daily series (`DailySeries`) and comparison rows (`ForecastRow`)
//! - model settings and run outputs (`SarimaConfig`, `AdditiveConfig`, `ForecastRun`, etc.)

pub mod types;

pub use types::*;
