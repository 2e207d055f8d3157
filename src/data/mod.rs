//! Synthetic data for running the dashboard without the real tables.

pub mod sample;

pub use sample::*;
