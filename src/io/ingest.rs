//! CSV ingest and type coercion.
//!
//! This module is responsible for turning the flat sales / stores / holidays
//! tables into typed records.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Fail fast**: an unparsable date or number aborts the load with its line number
//! - **Deterministic behavior** (records keep file order)
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{HolidayEvent, SalesRecord, StoreRecord};
use crate::error::PipelineError;

/// Load the sales table from a CSV file.
pub fn load_sales(path: &Path) -> Result<Vec<SalesRecord>, PipelineError> {
    let started = Instant::now();
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let records = load_sales_from_reader(file, &path.display().to_string())?;
    info!(
        path = %path.display(),
        rows = records.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded sales table"
    );
    Ok(records)
}

/// Load the sales table from any reader (`source_name` is used in error messages).
pub fn load_sales_from_reader<R: Read>(reader: R, source_name: &str) -> Result<Vec<SalesRecord>, PipelineError> {
    let mut reader = csv_reader(reader);
    let header_map = read_header_map(&mut reader, source_name)?;
    ensure_columns(&header_map, source_name, &["date", "store_nbr", "family", "sales"])?;

    let has_promo = header_map.contains_key("onpromotion");
    if !has_promo {
        debug!(source = source_name, "no `onpromotion` column; defaulting to 0");
    }

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| PipelineError::parse(source_name, Some(line), format!("CSV parse error: {e}")))?;
        let row = Row::new(&record, &header_map, source_name, line);

        out.push(SalesRecord {
            id: row.optional("id").map(|s| row.parse_num::<u64>("id", s)).transpose()?,
            date: row.date("date")?,
            store_nbr: row.num("store_nbr")?,
            family: row.required("family")?.to_string(),
            sales: row.float("sales")?,
            onpromotion: match row.optional("onpromotion") {
                Some(s) => row.parse_promo(s)?,
                None => 0,
            },
        });
    }

    Ok(out)
}

/// Load the stores reference table.
pub fn load_stores(path: &Path) -> Result<Vec<StoreRecord>, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let stores = load_stores_from_reader(file, &path.display().to_string())?;
    info!(path = %path.display(), rows = stores.len(), "loaded stores table");
    Ok(stores)
}

pub fn load_stores_from_reader<R: Read>(reader: R, source_name: &str) -> Result<Vec<StoreRecord>, PipelineError> {
    let mut reader = csv_reader(reader);
    let header_map = read_header_map(&mut reader, source_name)?;
    ensure_columns(&header_map, source_name, &["store_nbr", "city", "state"])?;

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| PipelineError::parse(source_name, Some(line), format!("CSV parse error: {e}")))?;
        let row = Row::new(&record, &header_map, source_name, line);

        out.push(StoreRecord {
            store_nbr: row.num("store_nbr")?,
            city: row.required("city")?.to_string(),
            state: row.required("state")?.to_string(),
            store_type: row.optional("type").unwrap_or_default().to_string(),
            cluster: row.optional("cluster").map(|s| row.parse_num::<u32>("cluster", s)).transpose()?.unwrap_or(0),
        });
    }
    Ok(out)
}

/// Load the holidays/events calendar.
pub fn load_holidays(path: &Path) -> Result<Vec<HolidayEvent>, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let events = load_holidays_from_reader(file, &path.display().to_string())?;
    info!(path = %path.display(), rows = events.len(), "loaded holidays table");
    Ok(events)
}

pub fn load_holidays_from_reader<R: Read>(reader: R, source_name: &str) -> Result<Vec<HolidayEvent>, PipelineError> {
    let mut reader = csv_reader(reader);
    let header_map = read_header_map(&mut reader, source_name)?;
    ensure_columns(&header_map, source_name, &["date", "description"])?;

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| PipelineError::parse(source_name, Some(line), format!("CSV parse error: {e}")))?;
        let row = Row::new(&record, &header_map, source_name, line);

        out.push(HolidayEvent {
            date: row.date("date")?,
            kind: row.optional("type").unwrap_or_default().to_string(),
            locale: row.optional("locale").unwrap_or_default().to_string(),
            locale_name: row.optional("locale_name").unwrap_or_default().to_string(),
            description: row.required("description")?.to_string(),
            transferred: match row.optional("transferred") {
                Some(s) => row.parse_bool("transferred", s)?,
                None => false,
            },
        });
    }
    Ok(out)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn read_header_map<R: Read>(
    reader: &mut csv::Reader<R>,
    source_name: &str,
) -> Result<HashMap<String, usize>, PipelineError> {
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::parse(source_name, Some(1), format!("Failed to read CSV headers: {e}")))?
        .clone();
    Ok(build_header_map(&headers))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_columns(
    header_map: &HashMap<String, usize>,
    source_name: &str,
    required: &[&str],
) -> Result<(), PipelineError> {
    for name in required {
        if !header_map.contains_key(*name) {
            return Err(PipelineError::parse(
                source_name,
                Some(1),
                format!("Missing required column: `{name}`"),
            ));
        }
    }
    Ok(())
}

/// A CSV record plus the context needed for good error messages.
struct Row<'a> {
    record: &'a StringRecord,
    header_map: &'a HashMap<String, usize>,
    source_name: &'a str,
    line: usize,
}

impl<'a> Row<'a> {
    fn new(
        record: &'a StringRecord,
        header_map: &'a HashMap<String, usize>,
        source_name: &'a str,
        line: usize,
    ) -> Self {
        Self {
            record,
            header_map,
            source_name,
            line,
        }
    }

    fn err(&self, message: String) -> PipelineError {
        PipelineError::parse(self.source_name, Some(self.line), message)
    }

    fn optional(&self, name: &str) -> Option<&'a str> {
        let idx = self.header_map.get(name)?;
        self.record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
    }

    fn required(&self, name: &str) -> Result<&'a str, PipelineError> {
        self.optional(name)
            .ok_or_else(|| self.err(format!("Missing required value: `{name}`")))
    }

    fn date(&self, name: &str) -> Result<NaiveDate, PipelineError> {
        let raw = self.required(name)?;
        parse_date(raw).map_err(|e| self.err(e))
    }

    fn float(&self, name: &str) -> Result<f64, PipelineError> {
        let raw = self.required(name)?;
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.err(format!("Invalid `{name}` value '{raw}' (expected a finite number)."))),
        }
    }

    fn num<T: std::str::FromStr>(&self, name: &str) -> Result<T, PipelineError> {
        let raw = self.required(name)?;
        self.parse_num(name, raw)
    }

    fn parse_num<T: std::str::FromStr>(&self, name: &str, raw: &str) -> Result<T, PipelineError> {
        raw.parse::<T>()
            .map_err(|_| self.err(format!("Invalid `{name}` value '{raw}' (expected a non-negative integer).")))
    }

    /// `onpromotion` is a count in the Kaggle data, but some exports write it as
    /// a float (`3.0`) or a boolean flag.
    fn parse_promo(&self, raw: &str) -> Result<u32, PipelineError> {
        if let Ok(v) = raw.parse::<u32>() {
            return Ok(v);
        }
        if let Ok(v) = raw.parse::<f64>() {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
                return Ok(v as u32);
            }
        }
        match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(1),
            "false" => Ok(0),
            _ => Err(self.err(format!("Invalid `onpromotion` value '{raw}' (expected a count)."))),
        }
    }

    fn parse_bool(&self, name: &str, raw: &str) -> Result<bool, PipelineError> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(self.err(format!("Invalid `{name}` value '{raw}' (expected True/False)."))),
        }
    }
}

/// Parse a calendar date.
///
/// ISO dates (`YYYY-MM-DD`) are the norm, but hand-edited exports often use
/// slash dates or carry a time suffix. Ambiguous slash dates are month-first
/// (`01/02/2017` is January 2nd); day-first is only tried when the first
/// field cannot be a month.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 6] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d/%m/%Y", "%d-%m-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }

    // `2017-01-01 00:00:00` / `2017-01-01T00:00:00`
    if let Some(prefix) = s.get(..10) {
        let rest = &s[10..];
        if rest.starts_with(' ') || rest.starts_with('T') {
            if let Ok(d) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return Ok(d);
            }
        }
    }

    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, MM-DD-YYYY."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn loads_kaggle_layout() {
        let csv = "\u{feff}id,date,store_nbr,family,sales,onpromotion\n\
                   0,2013-01-01,1,AUTOMOTIVE,0.0,0\n\
                   1,2013-01-01,1,BABY CARE,12.5,3\n\
                   2,2013-01-02,2,BEVERAGES,-2.0,0\n";
        let records = load_sales_from_reader(csv.as_bytes(), "train.csv").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, Some(0));
        assert_eq!(records[1].date, d(2013, 1, 1));
        assert_eq!(records[1].family, "BABY CARE");
        assert_eq!(records[1].onpromotion, 3);
        assert!((records[2].sales + 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_date_column_is_a_parse_error() {
        let csv = "store_nbr,family,sales\n1,AUTOMOTIVE,1.0\n";
        let err = load_sales_from_reader(csv.as_bytes(), "train.csv").unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
        assert!(err.to_string().contains("`date`"));
    }

    #[test]
    fn unparsable_date_reports_line() {
        let csv = "date,store_nbr,family,sales\n2013-01-01,1,A,1.0\nnot-a-date,1,A,2.0\n";
        let err = load_sales_from_reader(csv.as_bytes(), "train.csv").unwrap_err();
        match err {
            PipelineError::Parse { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn promotion_defaults_and_coercions() {
        let csv = "date,store_nbr,family,sales\n2013-01-01,1,A,1.0\n";
        let records = load_sales_from_reader(csv.as_bytes(), "x").unwrap();
        assert_eq!(records[0].onpromotion, 0);

        let csv = "date,store_nbr,family,sales,onpromotion\n2013-01-01,1,A,1.0,4.0\n2013-01-01,2,A,1.0,True\n";
        let records = load_sales_from_reader(csv.as_bytes(), "x").unwrap();
        assert_eq!(records[0].onpromotion, 4);
        assert_eq!(records[1].onpromotion, 1);
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        assert_eq!(parse_date("2017-08-15").unwrap(), d(2017, 8, 15));
        assert_eq!(parse_date("15/08/2017").unwrap(), d(2017, 8, 15));
        assert_eq!(parse_date("2017-08-15 00:00:00").unwrap(), d(2017, 8, 15));
        assert!(parse_date("2017-13-01").is_err());
    }

    #[test]
    fn ambiguous_slash_dates_are_month_first() {
        assert_eq!(parse_date("01/02/2017").unwrap(), d(2017, 1, 2));
        assert_eq!(parse_date("01-02-2017").unwrap(), d(2017, 1, 2));
        assert_eq!(parse_date("12/31/2016").unwrap(), d(2016, 12, 31));

        let csv = "date,store_nbr,family,sales\n01/02/2017,1,A,1.0\n01/03/2017,1,A,2.0\n";
        let records = load_sales_from_reader(csv.as_bytes(), "train.csv").unwrap();
        assert_eq!(records[0].date, d(2017, 1, 2));
        assert_eq!(records[1].date, d(2017, 1, 3));
    }

    #[test]
    fn loads_stores_and_holidays() {
        let stores = "store_nbr,city,state,type,cluster\n1,Quito,Pichincha,D,13\n2,Guayaquil,Guayas,A,1\n";
        let stores = load_stores_from_reader(stores.as_bytes(), "stores.csv").unwrap();
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[1].state, "Guayas");
        assert_eq!(stores[0].cluster, 13);

        let holidays = "date,type,locale,locale_name,description,transferred\n\
                        2012-03-02,Holiday,Local,Manta,Fundacion de Manta,False\n\
                        2012-10-09,Holiday,National,Ecuador,Independencia de Guayaquil,True\n";
        let events = load_holidays_from_reader(holidays.as_bytes(), "holidays.csv").unwrap();
        assert_eq!(events.len(), 2);
        assert!(!events[0].transferred);
        assert!(events[1].transferred);
        assert_eq!(events[1].locale, "National");
    }
}
