//! Shared fit/predict contract around every forecasting capability.
//!
//! `run_forecaster` is the only way the pipeline talks to a [`Forecaster`]:
//! it validates the training partition and the requested dates, runs the
//! capability, and guarantees the output is aligned with the requested dates.

use std::time::Instant;

use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::domain::{DailySeries, SearchStep};
use crate::error::PipelineError;
use crate::models::Forecaster;

/// Point predictions for a list of dates, plus what produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub model: &'static str,
    pub summary: String,
    pub search_trace: Vec<SearchStep>,
    /// `(date, predicted)` in the order the dates were requested.
    pub points: Vec<(NaiveDate, f64)>,
}

impl Prediction {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|(d, _)| *d).collect()
    }
}

/// Fit `forecaster` on `train` and predict one value per date in `dates`.
///
/// Errors:
/// - `Fit` when `train` is empty or shorter than the capability's minimum
/// - `Fit` when `dates` are not strictly ascending or do not follow the training window
/// - `JoinMismatch` when the capability returns more or fewer values than requested dates;
///   surplus values are reported against the days following the last requested date
pub fn run_forecaster<F: Forecaster>(
    forecaster: &F,
    train: &DailySeries,
    dates: &[NaiveDate],
) -> Result<Prediction, PipelineError> {
    let name = forecaster.name();
    let Some(last_train) = train.last_date() else {
        return Err(PipelineError::fit(
            name,
            "training partition is empty (cutoff precedes all data)",
        ));
    };
    if train.len() < forecaster.min_train_len() {
        return Err(PipelineError::fit(
            name,
            format!(
                "training partition has {} days, need at least {}",
                train.len(),
                forecaster.min_train_len()
            ),
        ));
    }

    let ordered = dates.windows(2).all(|w| w[0] < w[1]);
    if !ordered || dates.first().is_some_and(|d| *d <= last_train) {
        return Err(PipelineError::fit(
            name,
            format!("requested dates must be strictly ascending and after {last_train}"),
        ));
    }

    let start = Instant::now();
    let model = forecaster.fit(train)?;
    let values = forecaster.predict(&model, dates)?;

    if values.len() < dates.len() {
        return Err(PipelineError::JoinMismatch {
            predicted_only: Vec::new(),
            actual_only: dates[values.len()..].to_vec(),
        });
    }
    if values.len() > dates.len() {
        let last = dates.last().copied().unwrap_or(last_train);
        let predicted_only = (1..=values.len() - dates.len())
            .map(|k| last + Duration::days(k as i64))
            .collect();
        return Err(PipelineError::JoinMismatch {
            predicted_only,
            actual_only: Vec::new(),
        });
    }

    info!(
        model = name,
        train_days = train.len(),
        horizon = dates.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "forecast complete"
    );

    Ok(Prediction {
        model: name,
        summary: forecaster.describe(&model),
        search_trace: forecaster.search_trace(&model),
        points: dates.iter().copied().zip(values).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Predicts the last training value, `surplus` more (or fewer) times than asked.
    struct Naive {
        surplus: isize,
    }

    impl Forecaster for Naive {
        type Model = f64;

        fn name(&self) -> &'static str {
            "naive"
        }

        fn min_train_len(&self) -> usize {
            1
        }

        fn fit(&self, train: &DailySeries) -> Result<f64, PipelineError> {
            train
                .values()
                .last()
                .copied()
                .ok_or_else(|| PipelineError::fit("naive", "empty"))
        }

        fn predict(&self, model: &f64, dates: &[NaiveDate]) -> Result<Vec<f64>, PipelineError> {
            let n = (dates.len() as isize + self.surplus).max(0) as usize;
            Ok(vec![*model; n])
        }

        fn describe(&self, model: &f64) -> String {
            format!("naive({model})")
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, day).unwrap()
    }

    fn train() -> DailySeries {
        DailySeries::from_pairs(&[(d(1), 100.0)]).unwrap()
    }

    #[test]
    fn output_is_aligned_with_requested_dates() {
        let p = run_forecaster(&Naive { surplus: 0 }, &train(), &[d(2), d(3)]).unwrap();
        assert_eq!(p.points, vec![(d(2), 100.0), (d(3), 100.0)]);
        assert_eq!(p.summary, "naive(100)");
        assert!(p.search_trace.is_empty());
    }

    #[test]
    fn empty_training_is_a_fit_error() {
        let err = run_forecaster(&Naive { surplus: 0 }, &DailySeries::default(), &[d(2)]).unwrap_err();
        assert!(matches!(err, PipelineError::Fit { model: "naive", .. }));
    }

    #[test]
    fn dates_must_follow_training_window() {
        let f = Naive { surplus: 0 };
        assert!(run_forecaster(&f, &train(), &[d(1)]).is_err());
        assert!(run_forecaster(&f, &train(), &[d(3), d(2)]).is_err());
        assert!(run_forecaster(&f, &train(), &[]).unwrap().points.is_empty());
        let later = d(1) + Duration::days(30);
        assert!(run_forecaster(&f, &train(), &[later]).is_ok());
    }

    #[test]
    fn short_output_is_an_alignment_error() {
        let err = run_forecaster(&Naive { surplus: -1 }, &train(), &[d(2), d(3)]).unwrap_err();
        match err {
            PipelineError::JoinMismatch { actual_only, .. } => assert_eq!(actual_only, vec![d(3)]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn surplus_output_is_an_alignment_error() {
        let err = run_forecaster(&Naive { surplus: 2 }, &train(), &[d(2), d(3)]).unwrap_err();
        match err {
            PipelineError::JoinMismatch {
                predicted_only,
                actual_only,
            } => {
                assert_eq!(predicted_only, vec![d(4), d(5)]);
                assert!(actual_only.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }

        // No requested dates: surplus days follow the training window.
        let err = run_forecaster(&Naive { surplus: 1 }, &train(), &[]).unwrap_err();
        assert!(matches!(err, PipelineError::JoinMismatch { ref predicted_only, .. } if predicted_only == &vec![d(2)]));
    }
}
