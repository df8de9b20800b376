//! Fatal error kinds raised by the transform and join stages.
//!
//! Coercion failures are never represented here: unparseable numbers and
//! timestamps degrade to null cells. Everything in [`PipelineError`] aborts the
//! run before any output is written.

use thiserror::Error;

use crate::schema::ColumnType;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Column '{column}' not found in table")]
    MissingColumn { column: String },

    #[error(
        "Join validation '{validation}' failed: {side} table has duplicate key {key:?} on [{columns}]"
    )]
    CardinalityViolation {
        validation: String,
        side: &'static str,
        columns: String,
        key: String,
    },

    #[error("Row count changed after left join: {expected} -> {actual}")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("Type mismatch for join key '{column}': left {left} vs right {right}")]
    KeyTypeMismatch {
        column: String,
        left: ColumnType,
        right: ColumnType,
    },

    #[error("Column '{column}' has no numeric values to compute quantiles from")]
    InsufficientData { column: String },

    #[error("Column '{column}' is type {actual} but {expected} is required")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        actual: ColumnType,
    },

    #[error("Column name '{column}' is ambiguous after applying join suffixes")]
    DuplicateColumn { column: String },

    #[error("Column '{column}' has {actual} value(s) but the table has {expected} row(s)")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl PipelineError {
    pub(crate) fn missing_column(column: impl Into<String>) -> Self {
        PipelineError::MissingColumn {
            column: column.into(),
        }
    }
}
