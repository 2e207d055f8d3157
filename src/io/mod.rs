//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - memoized loads keyed by file identity (`cache`)
//! - CSV exports of source tables and comparisons (`export`)
//! - forecast run JSON read/write (`run_file`)

pub mod cache;
pub mod export;
pub mod ingest;
pub mod run_file;

pub use cache::*;
pub use export::*;
pub use ingest::*;
pub use run_file::*;
