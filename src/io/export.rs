//! CSV exports.
//!
//! - the loaded source tables, in the same layout the loader reads
//! - a comparison (date, actual, predicted, error)
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::{Path, PathBuf};

use csv::Writer;
use tracing::info;

use crate::domain::{ForecastRow, HolidayEvent, SalesRecord, StoreRecord};
use crate::error::PipelineError;

pub const SALES_EXPORT_FILE: &str = "sales.csv";
pub const STORES_EXPORT_FILE: &str = "stores.csv";
pub const HOLIDAYS_EXPORT_FILE: &str = "holidays_events.csv";

fn create_writer(path: &Path) -> Result<Writer<std::fs::File>, PipelineError> {
    Writer::from_path(path).map_err(|e| PipelineError::io(path, e.into()))
}

fn write_row(w: &mut Writer<std::fs::File>, path: &Path, row: &[String]) -> Result<(), PipelineError> {
    w.write_record(row).map_err(|e| PipelineError::io(path, e.into()))
}

fn finish(mut w: Writer<std::fs::File>, path: &Path, rows: usize) -> Result<(), PipelineError> {
    w.flush().map_err(|e| PipelineError::io(path, e))?;
    info!(path = %path.display(), rows, "wrote csv export");
    Ok(())
}

fn py_bool(v: bool) -> String {
    if v { "True" } else { "False" }.to_string()
}

/// Write sales records (`id` column only when every record carries one).
pub fn write_sales_csv(path: &Path, records: &[SalesRecord]) -> Result<(), PipelineError> {
    let with_id = !records.is_empty() && records.iter().all(|r| r.id.is_some());
    let mut w = create_writer(path)?;

    let mut header = vec!["date", "store_nbr", "family", "sales", "onpromotion"];
    if with_id {
        header.insert(0, "id");
    }
    write_row(&mut w, path, &header.iter().map(|s| s.to_string()).collect::<Vec<_>>())?;

    for r in records {
        let mut row = vec![
            r.date.to_string(),
            r.store_nbr.to_string(),
            r.family.clone(),
            r.sales.to_string(),
            r.onpromotion.to_string(),
        ];
        if let (true, Some(id)) = (with_id, r.id) {
            row.insert(0, id.to_string());
        }
        write_row(&mut w, path, &row)?;
    }
    finish(w, path, records.len())
}

pub fn write_stores_csv(path: &Path, stores: &[StoreRecord]) -> Result<(), PipelineError> {
    let mut w = create_writer(path)?;
    write_row(
        &mut w,
        path,
        &["store_nbr", "city", "state", "type", "cluster"].map(String::from),
    )?;
    for s in stores {
        write_row(
            &mut w,
            path,
            &[
                s.store_nbr.to_string(),
                s.city.clone(),
                s.state.clone(),
                s.store_type.clone(),
                s.cluster.to_string(),
            ],
        )?;
    }
    finish(w, path, stores.len())
}

pub fn write_holidays_csv(path: &Path, events: &[HolidayEvent]) -> Result<(), PipelineError> {
    let mut w = create_writer(path)?;
    write_row(
        &mut w,
        path,
        &["date", "type", "locale", "locale_name", "description", "transferred"].map(String::from),
    )?;
    for e in events {
        write_row(
            &mut w,
            path,
            &[
                e.date.to_string(),
                e.kind.clone(),
                e.locale.clone(),
                e.locale_name.clone(),
                e.description.clone(),
                py_bool(e.transferred),
            ],
        )?;
    }
    finish(w, path, events.len())
}

/// Write the comparison rows.
pub fn write_comparison_csv(path: &Path, rows: &[ForecastRow]) -> Result<(), PipelineError> {
    let mut w = create_writer(path)?;
    write_row(
        &mut w,
        path,
        &["date", "actual_sales", "predicted_sales", "error"].map(String::from),
    )?;
    for r in rows {
        write_row(
            &mut w,
            path,
            &[
                r.date.to_string(),
                format!("{:.4}", r.actual_sales),
                format!("{:.4}", r.predicted_sales),
                format!("{:.4}", r.predicted_sales - r.actual_sales),
            ],
        )?;
    }
    finish(w, path, rows.len())
}

/// Write every non-empty source table into `dir` (created if missing).
/// Returns the written paths.
pub fn export_source_tables(
    dir: &Path,
    records: &[SalesRecord],
    stores: &[StoreRecord],
    holidays: &[HolidayEvent],
) -> Result<Vec<PathBuf>, PipelineError> {
    std::fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut written = Vec::new();
    let sales_path = dir.join(SALES_EXPORT_FILE);
    write_sales_csv(&sales_path, records)?;
    written.push(sales_path);

    if !stores.is_empty() {
        let path = dir.join(STORES_EXPORT_FILE);
        write_stores_csv(&path, stores)?;
        written.push(path);
    }
    if !holidays.is_empty() {
        let path = dir.join(HOLIDAYS_EXPORT_FILE);
        write_holidays_csv(&path, holidays)?;
        written.push(path);
    }
    Ok(written)
}
