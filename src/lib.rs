//! `sales-dash` library crate.
//!
//! The binary (`salesdash`) is a thin wrapper around this library, so the
//! pipeline is testable without spawning processes or a terminal.

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod series;
pub mod tui;
