//! Progress reporting for the contamination pipeline.
//!
//! The pipeline emits one update when it starts, one per operator and a
//! final update on completion or failure.
//!
//! # Example
//!
//! ```rust,ignore
//! use untidy::Contaminator;
//!
//! let result = Contaminator::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .contaminate(&df)?;
//! ```

use crate::types::OperatorKind;
use serde::{Deserialize, Serialize};

/// Stages of the contamination pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContaminationStage {
    /// Pipeline is validating input and seeding the random source
    Initializing,
    /// Scaling numeric cells into outliers
    Outliers,
    /// Appending noise to text cells
    TextNoise,
    /// Encoding text columns as bytes
    EncodingChange,
    /// Casting numeric columns to text
    NumericToText,
    /// Injecting nulls and markers
    MissingValues,
    /// Appending duplicate rows
    DuplicateRows,
    /// Appending duplicate columns
    DuplicateColumns,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl ContaminationStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Outliers => OperatorKind::Outliers.display_name(),
            Self::TextNoise => OperatorKind::TextNoise.display_name(),
            Self::EncodingChange => OperatorKind::EncodingChange.display_name(),
            Self::NumericToText => OperatorKind::NumericToText.display_name(),
            Self::MissingValues => OperatorKind::MissingValues.display_name(),
            Self::DuplicateRows => OperatorKind::DuplicateRows.display_name(),
            Self::DuplicateColumns => OperatorKind::DuplicateColumns.display_name(),
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }
}

impl From<OperatorKind> for ContaminationStage {
    fn from(operator: OperatorKind) -> Self {
        match operator {
            OperatorKind::Outliers => Self::Outliers,
            OperatorKind::TextNoise => Self::TextNoise,
            OperatorKind::EncodingChange => Self::EncodingChange,
            OperatorKind::NumericToText => Self::NumericToText,
            OperatorKind::MissingValues => Self::MissingValues,
            OperatorKind::DuplicateRows => Self::DuplicateRows,
            OperatorKind::DuplicateColumns => Self::DuplicateColumns,
        }
    }
}

/// Progress update emitted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: ContaminationStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,

    /// Number of operators finished so far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    /// Number of operators enabled for this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    /// Creates a new progress update without item counts.
    pub fn new(stage: ContaminationStage, progress: f32, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Creates a progress update for operator `current` out of `total`.
    pub fn with_items(
        stage: ContaminationStage,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            items_processed: Some(current),
            items_total: Some(total),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(ContaminationStage::Complete, 1.0, message)
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(ContaminationStage::Failed, 0.0, message)
    }
}

/// Trait for receiving progress updates during contamination.
///
/// Implementations must be `Send + Sync` so a [`Contaminator`](super::Contaminator)
/// holding one can move to another thread.
pub trait ProgressReporter: Send + Sync {
    /// Called once per pipeline stage.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
