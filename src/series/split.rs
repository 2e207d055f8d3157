//! Train/test split at a cutoff date.

use chrono::NaiveDate;
use tracing::info;

use crate::domain::DailySeries;

/// Partition `series` into `(train, test)`.
///
/// - train: every row with `date <= cutoff`
/// - test: every row with `date > cutoff`
///
/// Both halves keep ascending order and together contain exactly the input rows.
/// A cutoff outside the observed range simply leaves one half empty.
pub fn split(series: &DailySeries, cutoff: NaiveDate) -> (DailySeries, DailySeries) {
    let points = series.points();
    let idx = points.partition_point(|p| p.date <= cutoff);

    let train = DailySeries::from_ordered(points[..idx].to_vec());
    let test = DailySeries::from_ordered(points[idx..].to_vec());

    info!(%cutoff, train_days = train.len(), test_days = test.len(), "split daily series");
    (train, test)
}
