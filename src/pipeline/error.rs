//! Error types for the withdrawal pipeline.
//!
//! Only conditions that abort a run are errors. Rows whose fields cannot be
//! coerced are not errors: they are counted in [`FilterStats`] and skipped.
//!
//! [`FilterStats`]: crate::pipeline::FilterStats

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while loading or validating a dataset.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The source file or table is missing or unreadable.
    ///
    /// Reported to the end user; the run stops without partial output.
    #[error("Data unavailable at {path}: {reason}")]
    DataUnavailable { path: PathBuf, reason: String },

    /// Required columns are absent after header normalization.
    #[error("Schema mismatch: missing column(s) {missing:?}. Available columns: {available:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        available: Vec<String>,
    },

    /// Two headers normalize to the same column name.
    #[error("Duplicate column after header normalization: '{0}'")]
    DuplicateColumn(String),

    /// A period string is not of the form `YYYY-MM`.
    #[error("Invalid period '{0}': expected YYYY-MM")]
    InvalidPeriod(String),

    /// Pass-through for table-level failures.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PipelineError::DataUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the errors that should be shown as a plain user message.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, PipelineError::DataUnavailable { .. })
    }
}

/// Convenience alias used throughout the pipeline.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
