//! Series construction from raw sales records.
//!
//! - `aggregate`: records → one total per calendar day
//! - `split`: daily series → (train, test) at a cutoff date
//! - `profile`: exploratory summaries (per year / month / weekday / family / store)

pub mod aggregate;
pub mod profile;
pub mod split;

pub use aggregate::*;
pub use profile::*;
pub use split::*;
