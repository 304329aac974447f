//! Load-time error types.
//!
//! Everything that can go wrong while reading the dataset has a named
//! variant. Aggregation never fails; degenerate inputs resolve to `None`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Line {line}: missing value in column '{column}'")]
    MissingValue { line: usize, column: &'static str },

    #[error("Line {line}: unparseable date in column '{column}': {value:?}")]
    InvalidDate {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("Line {line}: non-numeric value in column '{column}': {value:?}")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
}

impl DashboardError {
    /// True for errors tied to a single row, which the `drop` policy may skip.
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            DashboardError::MissingValue { .. }
                | DashboardError::InvalidDate { .. }
                | DashboardError::InvalidNumber { .. }
        )
    }
}

/// Result type alias for loading operations.
pub type LoadResult<T> = Result<T, DashboardError>;
