//! Mathematical utilities: Fourier seasonality features and least squares.

pub mod fourier;
pub mod ols;

pub use fourier::*;
pub use ols::*;
