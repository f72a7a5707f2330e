//! Error taxonomy for a pipeline run

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

use crate::table::DataType;

/// Errors raised by cleaning, aggregation and I/O.
///
/// Advisory conditions (warnings, non-fatal assertions, unmatched join rows,
/// empty keyword corpora) are logged and never show up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fatal data-quality violation: a missing value with no default, or a
    /// fatal assertion. The whole table load is aborted.
    #[error("{table} - {message}")]
    Integrity { table: String, message: String },

    /// A column the operation needs is absent from the table.
    #[error("{table} - column '{column}' not found")]
    Schema { table: String, column: String },

    /// A column exists but holds a type the operation cannot use.
    #[error("{table} - column '{column}' has type {found}, expected {expected}")]
    ColumnType {
        table: String,
        column: String,
        expected: DataType,
        found: DataType,
    },

    /// A raw input file could not be read or parsed.
    #[error("{table} - {source}")]
    Read {
        table: String,
        source: Box<PipelineError>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error(transparent)]
    Parquet(#[from] ParquetError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn integrity(table: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Integrity {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        PipelineError::Schema {
            table: table.into(),
            column: column.into(),
        }
    }

    /// True for data-quality failures that retrying cannot fix.
    pub fn is_integrity(&self) -> bool {
        matches!(self, PipelineError::Integrity { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
