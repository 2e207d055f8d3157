//! Daily aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::{DailyPoint, DailySeries, SalesRecord};

/// Collapse sales records into one total per calendar day.
///
/// - one output row per distinct input date, ascending
/// - dates absent from the input stay absent
/// - sums use plain `f64` addition in input order; negative sales are summed as-is
pub fn aggregate_daily(records: &[SalesRecord]) -> DailySeries {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut negative = 0usize;

    for r in records {
        if r.sales < 0.0 {
            negative += 1;
        }
        *totals.entry(r.date).or_insert(0.0) += r.sales;
    }

    if negative > 0 {
        // Returns/adjustments or data errors; kept in the totals until the
        // business decides otherwise.
        warn!(negative_records = negative, "sales table contains negative sales values");
    }

    let points: Vec<DailyPoint> = totals
        .into_iter()
        .map(|(date, total_sales)| DailyPoint { date, total_sales })
        .collect();

    info!(records = records.len(), days = points.len(), "aggregated daily totals");
    DailySeries::from_ordered(points)
}
