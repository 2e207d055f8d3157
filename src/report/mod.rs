//! Comparison of predicted vs actual sales: join, accuracy and resampling.

pub mod format;

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::{Accuracy, DailySeries, ForecastRow, Frequency};
use crate::error::PipelineError;

/// Inner-join predictions with the test partition on date.
///
/// The two date sets must be identical; any date present on one side only
/// (or predicted twice) is reported as `JoinMismatch`. Output is ascending by
/// date. Empty inputs give an empty comparison.
pub fn assemble_comparison(
    predicted: &[(NaiveDate, f64)],
    test: &DailySeries,
) -> Result<Vec<ForecastRow>, PipelineError> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut duplicated = Vec::new();
    for &(date, value) in predicted {
        if by_date.insert(date, value).is_some() {
            duplicated.push(date);
        }
    }

    let actual: BTreeMap<NaiveDate, f64> = test.points().iter().map(|p| (p.date, p.total_sales)).collect();

    let mut predicted_only: Vec<NaiveDate> = by_date.keys().filter(|d| !actual.contains_key(d)).copied().collect();
    predicted_only.extend(duplicated);
    let actual_only: Vec<NaiveDate> = actual.keys().filter(|d| !by_date.contains_key(d)).copied().collect();

    if !predicted_only.is_empty() || !actual_only.is_empty() {
        predicted_only.sort();
        predicted_only.dedup();
        return Err(PipelineError::JoinMismatch {
            predicted_only,
            actual_only,
        });
    }

    Ok(by_date
        .into_iter()
        .map(|(date, predicted_sales)| ForecastRow {
            date,
            predicted_sales,
            actual_sales: actual[&date],
        })
        .collect())
}

/// Point accuracy of a comparison. `None` for an empty comparison.
///
/// MAPE skips days whose actual value is zero.
pub fn accuracy(rows: &[ForecastRow]) -> Option<Accuracy> {
    if rows.is_empty() {
        return None;
    }
    let n = rows.len() as f64;

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut bias_sum = 0.0;
    let mut pct_sum = 0.0;
    let mut pct_n = 0usize;
    for r in rows {
        let err = r.predicted_sales - r.actual_sales;
        abs_sum += err.abs();
        sq_sum += err * err;
        bias_sum += err;
        if r.actual_sales != 0.0 {
            pct_sum += (err / r.actual_sales).abs();
            pct_n += 1;
        }
    }

    Some(Accuracy {
        n: rows.len(),
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
        mape: (pct_n > 0).then(|| 100.0 * pct_sum / pct_n as f64),
        bias: bias_sum / n,
    })
}

/// First day of the period containing `date`.
pub fn period_start(date: NaiveDate, freq: Frequency) -> NaiveDate {
    match freq {
        Frequency::Daily => date,
        Frequency::Weekly => date - Duration::days(date.weekday().num_days_from_monday() as i64),
        Frequency::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// Sum predicted and actual sales per period, labeled by period start.
///
/// Partial periods at either end are summed over the days present.
pub fn resample(rows: &[ForecastRow], freq: Frequency) -> Vec<ForecastRow> {
    if freq == Frequency::Daily {
        return rows.to_vec();
    }

    let mut acc: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for r in rows {
        let (pred, actual) = acc.entry(period_start(r.date, freq)).or_insert((0.0, 0.0));
        *pred += r.predicted_sales;
        *actual += r.actual_sales;
    }

    acc.into_iter()
        .map(|(date, (predicted_sales, actual_sales))| ForecastRow {
            date,
            predicted_sales,
            actual_sales,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(date: NaiveDate, predicted_sales: f64, actual_sales: f64) -> ForecastRow {
        ForecastRow {
            date,
            predicted_sales,
            actual_sales,
        }
    }

    fn test_partition() -> DailySeries {
        DailySeries::from_pairs(&[(d(2017, 1, 2), 120.0), (d(2017, 1, 3), 90.0)]).unwrap()
    }

    #[test]
    fn joins_on_date_in_ascending_order() {
        let predicted = vec![(d(2017, 1, 3), 95.0), (d(2017, 1, 2), 110.0)];
        let rows = assemble_comparison(&predicted, &test_partition()).unwrap();
        assert_eq!(
            rows,
            vec![row(d(2017, 1, 2), 110.0, 120.0), row(d(2017, 1, 3), 95.0, 90.0)]
        );
    }

    #[test]
    fn mismatched_dates_are_rejected() {
        let predicted = vec![(d(2017, 1, 2), 110.0), (d(2017, 1, 4), 95.0)];
        match assemble_comparison(&predicted, &test_partition()).unwrap_err() {
            PipelineError::JoinMismatch {
                predicted_only,
                actual_only,
            } => {
                assert_eq!(predicted_only, vec![d(2017, 1, 4)]);
                assert_eq!(actual_only, vec![d(2017, 1, 3)]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let twice = vec![(d(2017, 1, 2), 1.0), (d(2017, 1, 2), 2.0), (d(2017, 1, 3), 3.0)];
        assert!(assemble_comparison(&twice, &test_partition()).is_err());
    }

    #[test]
    fn empty_sides_give_empty_comparison() {
        assert!(assemble_comparison(&[], &DailySeries::default()).unwrap().is_empty());
    }

    #[test]
    fn accuracy_metrics() {
        let rows = vec![row(d(2017, 1, 2), 110.0, 100.0), row(d(2017, 1, 3), 0.0, 0.0), row(d(2017, 1, 4), 40.0, 50.0)];
        let acc = accuracy(&rows).unwrap();
        assert_eq!(acc.n, 3);
        assert!((acc.mae - 20.0 / 3.0).abs() < 1e-12);
        assert!((acc.rmse - (200.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((acc.mape.unwrap() - 15.0).abs() < 1e-12);
        assert!(acc.bias.abs() < 1e-12);
        assert!(accuracy(&[]).is_none());
        assert!(accuracy(&[row(d(2017, 1, 2), 1.0, 0.0)]).unwrap().mape.is_none());
    }

    #[test]
    fn weekly_and_monthly_sums() {
        // 2017-01-01 is a Sunday; 2017-01-02 starts the next ISO week.
        let rows = vec![
            row(d(2016, 12, 31), 1.0, 2.0),
            row(d(2017, 1, 1), 3.0, 4.0),
            row(d(2017, 1, 2), 5.0, 6.0),
            row(d(2017, 1, 8), 7.0, 8.0),
        ];

        let weekly = resample(&rows, Frequency::Weekly);
        assert_eq!(
            weekly,
            vec![row(d(2016, 12, 26), 4.0, 6.0), row(d(2017, 1, 2), 12.0, 14.0)]
        );

        let monthly = resample(&rows, Frequency::Monthly);
        assert_eq!(
            monthly,
            vec![row(d(2016, 12, 1), 1.0, 2.0), row(d(2017, 1, 1), 15.0, 18.0)]
        );

        assert_eq!(resample(&rows, Frequency::Daily), rows);
    }
}
