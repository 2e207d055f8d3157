//! Forecasting capabilities.
//!
//! Each capability implements [`Forecaster`]: fit on a training series, then
//! predict one value per requested calendar date. The alignment checks shared
//! by every capability live in `fit::adapter`, so implementations only deal
//! with their own estimation.

pub mod additive;
pub mod sarima;

use chrono::NaiveDate;

use crate::domain::{DailySeries, SearchStep};
use crate::error::PipelineError;

pub use additive::{AdditiveForecaster, AdditiveModel, Components};
pub use sarima::{SarimaFit, SarimaForecaster, SarimaModel};

/// `fit(train) -> model; predict(model, dates) -> values`.
pub trait Forecaster {
    /// Fitted state. Owned by the caller; never shared between runs.
    type Model;

    /// Short stable name (logs, error messages).
    fn name(&self) -> &'static str;

    /// Smallest training series this capability accepts.
    fn min_train_len(&self) -> usize;

    fn fit(&self, train: &DailySeries) -> Result<Self::Model, PipelineError>;

    /// One prediction per date in `dates`, same order.
    fn predict(&self, model: &Self::Model, dates: &[NaiveDate]) -> Result<Vec<f64>, PipelineError>;

    /// One-line description of the fitted model.
    fn describe(&self, model: &Self::Model) -> String;

    /// Candidates visited while choosing the model structure, if any.
    fn search_trace(&self, _model: &Self::Model) -> Vec<SearchStep> {
        Vec::new()
    }
}
