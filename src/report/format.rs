//! Formatted terminal output: run summary, comparison tables and data overview.
//!
//! Formatting lives in one place so the pipeline code stays free of layout
//! decisions and output changes stay localized.

use crate::domain::{ForecastRow, ForecastRun, Frequency, HolidayEvent, SalesRecord, SearchStep, StoreRecord};
use crate::report::resample;
use crate::series::profile::{
    MONTH_LABELS, holiday_counts_by_locale, monthly_means, stores_per_city, stores_per_state, top_families,
    weekday_means, yearly_promotion_vs_sales, yearly_totals,
};

/// Dataset/partition facts, chosen model and accuracy.
pub fn format_run_summary(run: &ForecastRun) -> String {
    let mut out = String::new();

    out.push_str("=== salesdash - forecast vs actual ===\n");
    out.push_str(&format!("Model: {}\n", run.model.display_name()));
    out.push_str(&format!("Cutoff: {} (train: date <= cutoff)\n", run.cutoff));
    match run.train_range {
        Some((first, last)) => out.push_str(&format!(
            "Train: {} days [{first} .. {last}]\n",
            run.train_days
        )),
        None => out.push_str("Train: 0 days\n"),
    }
    out.push_str(&format!("Test: {} days\n", run.test_days));
    out.push_str(&format!("Fitted: {}\n", run.model_summary));

    match &run.accuracy {
        Some(a) => {
            let mape = a
                .mape
                .map(|m| format!("{m:.2}%"))
                .unwrap_or_else(|| "n/a".to_string());
            out.push_str(&format!(
                "Accuracy: MAE={} RMSE={} MAPE={mape} bias={}\n",
                fmt_sales(a.mae),
                fmt_sales(a.rmse),
                fmt_sales(a.bias)
            ));
        }
        None => out.push_str("Accuracy: n/a (empty test partition)\n"),
    }
    out.push('\n');
    out
}

/// Comparison table at the requested frequency.
pub fn format_comparison(rows: &[ForecastRow], freq: Frequency) -> String {
    let rows = resample(rows, freq);
    let mut out = String::new();

    out.push_str(&format!("Comparison ({}):\n", freq.label()));
    push_line(
        &mut out,
        format!("{:<10} {:>14} {:>14} {:>12}", "date", "actual", "predicted", "error"),
    );
    push_line(&mut out, format!("{:-<10} {:-<14} {:-<14} {:-<12}", "", "", "", ""));

    for r in &rows {
        push_line(
            &mut out,
            format!(
                "{:<10} {:>14} {:>14} {:>12}",
                r.date.to_string(),
                fmt_sales(r.actual_sales),
                fmt_sales(r.predicted_sales),
                fmt_sales(r.predicted_sales - r.actual_sales)
            ),
        );
    }
    if rows.is_empty() {
        out.push_str("(no test dates)\n");
    }
    out
}

/// Candidates visited by the order search, in evaluation order.
pub fn format_search_trace(trace: &[SearchStep]) -> String {
    if trace.is_empty() {
        return String::new();
    }
    let mut out = String::from("Order search:\n");
    for step in trace {
        let aic = step
            .aic
            .map(|a| format!("{a:.2}"))
            .unwrap_or_else(|| "failed".to_string());
        push_line(&mut out, format!("  {:<22} AIC={aic}", step.order.to_string()));
    }
    out
}

/// Exploration tables for the loaded source tables.
pub fn format_data_overview(
    records: &[SalesRecord],
    stores: &[StoreRecord],
    holidays: &[HolidayEvent],
    top_n: usize,
) -> String {
    let mut out = String::new();

    out.push_str("Total sales per year:\n");
    for (year, total) in yearly_totals(records) {
        push_line(&mut out, format!("  {year:<6} {:>16}", fmt_sales(total)));
    }

    out.push_str("\nMean sales per month:\n");
    for (month, mean) in monthly_means(records) {
        let label = MONTH_LABELS.get(month as usize - 1).copied().unwrap_or("?");
        push_line(&mut out, format!("  {label:<6} {:>16}", fmt_sales(mean)));
    }

    out.push_str("\nMean sales per weekday:\n");
    for (day, mean) in weekday_means(records) {
        push_line(&mut out, format!("  {:<6} {:>16}", day.to_string(), fmt_sales(mean)));
    }

    out.push_str(&format!("\nTop {top_n} families by mean sales:\n"));
    for (family, mean) in top_families(records, top_n) {
        push_line(&mut out, format!("  {:<28} {:>12}", truncate(&family, 28), fmt_sales(mean)));
    }

    out.push_str("\nPromotions vs sales per year:\n");
    push_line(&mut out, format!("  {:<6} {:>14} {:>14}", "year", "onpromotion", "sales"));
    for row in yearly_promotion_vs_sales(records) {
        push_line(
            &mut out,
            format!(
                "  {:<6} {:>14.2} {:>14}",
                row.year,
                row.mean_onpromotion,
                fmt_sales(row.mean_sales)
            ),
        );
    }

    if !stores.is_empty() {
        out.push_str("\nStores per state:\n");
        for (state, n) in stores_per_state(stores) {
            push_line(&mut out, format!("  {:<28} {n:>4}", truncate(&state, 28)));
        }
        out.push_str("\nStores per city:\n");
        for ((city, state), n) in stores_per_city(stores) {
            let label = format!("{city} ({state})");
            push_line(&mut out, format!("  {:<28} {n:>4}", truncate(&label, 28)));
        }
    }

    if !holidays.is_empty() {
        out.push_str("\nCalendar events per locale:\n");
        for (locale, n) in holiday_counts_by_locale(holidays) {
            push_line(&mut out, format!("  {:<28} {n:>4}", truncate(&locale, 28)));
        }
    }

    out
}

/// Sales with thousands separators and two decimals.
pub fn fmt_sales(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let s = format!("{:.2}", v.abs());
    let (int, frac) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && s.chars().any(|c| c != '0' && c != '.') { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
