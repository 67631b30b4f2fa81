//! Custom error types for the contamination library.
//!
//! This module provides the error hierarchy using `thiserror`. Every
//! sampler and operator returns [`ContaminationError`] and the pipeline
//! surfaces the first failure unchanged, only wrapped with context.
//!
//! Errors are serializable so a caller can hand them to a frontend or
//! print them as JSON next to the contamination summary.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for contamination operations.
#[derive(Error, Debug)]
pub enum ContaminationError {
    /// Input is neither a table nor a single column.
    #[error("Invalid input: {0}")]
    InvalidInputKind(String),

    /// A type filter matched no columns but a non-zero selection was requested.
    #[error("No columns match type filter '{filter}' ({requested} requested)")]
    EmptyEligibleSet { filter: String, requested: usize },

    /// A sample without replacement asked for more items than exist.
    #[error("Cannot sample {requested} items without replacement from {available}")]
    InsufficientPopulation { requested: usize, available: usize },

    /// Corruption level outside of 0..=10.
    #[error("Invalid corruption level {0} (must be between 0 and 10)")]
    InvalidCorruptionLevel(u8),

    /// Type filter string could not be parsed.
    #[error("Unknown column type filter '{0}' (expected str, num or any)")]
    UnknownTypeFilter(String),

    /// Column reference does not resolve against the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ContaminationError>,
    },
}

impl ContaminationError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ContaminationError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code.
    ///
    /// Context wrappers report the code of the error they wrap, so a
    /// pipeline failure keeps the code of the operator that raised it.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInputKind(_) => "INVALID_INPUT_KIND",
            Self::EmptyEligibleSet { .. } => "EMPTY_ELIGIBLE_SET",
            Self::InsufficientPopulation { .. } => "INSUFFICIENT_POPULATION",
            Self::InvalidCorruptionLevel(_) => "INVALID_CORRUPTION_LEVEL",
            Self::UnknownTypeFilter(_) => "UNKNOWN_TYPE_FILTER",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Returns the innermost error, skipping context wrappers.
    pub fn root(&self) -> &ContaminationError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this error comes from sampling (empty or too small population).
    ///
    /// Callers that tolerate a no-op, for instance by disabling the
    /// offending operator, match on this.
    pub fn is_sampling_error(&self) -> bool {
        matches!(
            self.root(),
            Self::EmptyEligibleSet { .. } | Self::InsufficientPopulation { .. }
        )
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ContaminationError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ContaminationError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for contamination operations.
pub type Result<T> = std::result::Result<T, ContaminationError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ContaminationError::Polars(e).with_context(context))
    }
}
