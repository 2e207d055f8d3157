//! Error types.
//!
//! - `PipelineError` is what the library returns: load, fit and join failures.
//! - `AppError` is what the front-ends return: a message plus a process exit code.

use std::path::PathBuf;

use chrono::NaiveDate;

/// Failure of one stage of the load → aggregate → split → fit → assemble pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Missing/unparsable column in an input table.
    #[error("{}", fmt_parse(.source_name, .line, .message))]
    Parse {
        source_name: String,
        line: Option<usize>,
        message: String,
    },

    /// The forecasting capability could not be fitted (or could not predict).
    #[error("{model} fit failed: {message}")]
    Fit { model: &'static str, message: String },

    /// Predicted and actual date sets disagree.
    #[error(
        "predicted/actual dates disagree: {} predicted-only, {} actual-only (first: {})",
        .predicted_only.len(),
        .actual_only.len(),
        first_date(.predicted_only, .actual_only)
    )]
    JoinMismatch {
        predicted_only: Vec<NaiveDate>,
        actual_only: Vec<NaiveDate>,
    },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn parse(source_name: impl Into<String>, line: Option<usize>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }

    pub fn fit(model: &'static str, message: impl Into<String>) -> Self {
        Self::Fit {
            model,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code used when this error reaches `main`.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Parse { .. } | PipelineError::Io { .. } => 2,
            PipelineError::Fit { .. } => 3,
            PipelineError::JoinMismatch { .. } => 4,
        }
    }
}

fn fmt_parse(source_name: &str, line: &Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("{source_name}:{line}: {message}"),
        None => format!("{source_name}: {message}"),
    }
}

fn first_date(a: &[NaiveDate], b: &[NaiveDate]) -> String {
    a.iter()
        .chain(b.iter())
        .min()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_mentions_line() {
        let err = PipelineError::parse("train.csv", Some(7), "Invalid date 'x'");
        assert_eq!(err.to_string(), "train.csv:7: Invalid date 'x'");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn join_mismatch_converts_to_defect_exit_code() {
        let d = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap();
        let err = PipelineError::JoinMismatch {
            predicted_only: vec![d],
            actual_only: Vec::new(),
        };
        assert!(err.to_string().contains("2017-01-02"));
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 4);
    }
}
