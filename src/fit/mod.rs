//! Forecast orchestration.
//!
//! Responsibilities:
//!
//! - run any capability behind the common fit/predict contract (`adapter`)
//! - search SARIMA orders stepwise by AIC (`order_search`, parallel per step)

pub mod adapter;
pub mod order_search;

pub use adapter::*;
pub use order_search::*;
