//! Read/write forecast run JSON files.
//!
//! A run file is the portable record of one forecast trigger (model, cutoff,
//! partition sizes, accuracy, comparison rows). `salesdash plot --run <file>`
//! replays it without reloading data or refitting.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::domain::ForecastRun;
use crate::error::PipelineError;

/// Write a run as pretty-printed JSON.
pub fn write_run_json(path: &Path, run: &ForecastRun) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::to_writer_pretty(file, run).map_err(|e| PipelineError::io(path, e.into()))?;
    info!(path = %path.display(), rows = run.rows.len(), "wrote run json");
    Ok(())
}

/// Read a run JSON file.
pub fn read_run_json(path: &Path) -> Result<ForecastRun, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        let line = (e.line() > 0).then_some(e.line());
        PipelineError::parse(path.display().to_string(), line, format!("invalid run JSON: {e}"))
    })
}
