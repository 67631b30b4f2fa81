//! Synthetic Data Contamination Library
//!
//! Injects data-quality defects into clean tables, built with Rust and Polars.
//! Useful for exercising data-cleaning pipelines and data-quality tooling
//! against known, reproducible damage.
//!
//! # Overview
//!
//! Every operator takes a single corruption level from 0 (no change) to 10
//! (maximum change) and returns a contaminated copy of its input:
//!
//! - **Missing values**: nulls, or a `"?"` marker in text and numeric columns
//! - **Outliers**: numeric cells scaled far outside their column's range
//! - **Text noise**: punctuation or a double space appended to text cells
//! - **Encoding change**: text columns turned into ASCII or UTF-16 bytes
//! - **Type coercion**: numeric columns cast to text
//! - **Duplication**: copies of rows or columns appended to the table
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use untidy::{ContaminationConfig, Contaminator};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("data.csv".into()))?
//!     .finish()?;
//!
//! let config = ContaminationConfig::builder()
//!     .corruption_level(5)
//!     .seed(42)
//!     .build()?;
//!
//! let result = Contaminator::new(config)?.contaminate(&df)?;
//! println!("{:?} -> {:?}", result.summary.shape_before, result.summary.shape_after);
//! ```
//!
//! # Single Operators
//!
//! Operators are plain functions over a `DataFrame` and an injected random
//! source:
//!
//! ```rust,ignore
//! use untidy::{CorruptionLevel, contaminators::add_outliers};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let dirty = add_outliers(&df, CorruptionLevel::new(6)?, &mut rng)?;
//! ```
//!
//! # Configuration
//!
//! Use [`ContaminationConfig`] to choose the level, the operators and the
//! random seed:
//!
//! ```rust,ignore
//! use untidy::{ContaminationConfig, MissingMarkerPolicy, OperatorKind};
//!
//! let config = ContaminationConfig::builder()
//!     .corruption_level(3)
//!     .operator(OperatorKind::DuplicateColumns, false)
//!     .missing_marker_policy(MissingMarkerPolicy::NullOnly)
//!     .max_cell_percent(40)
//!     .verbose(true)
//!     .build()?;
//! ```

pub mod config;
pub mod contaminators;
pub mod error;
pub mod pipeline;
pub mod sampling;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, ContaminationConfig, ContaminationConfigBuilder, OperatorFlags,
};
pub use contaminators::{MissingMarkerPolicy, OperatorOptions, TextEncoding};
pub use error::{ContaminationError, ResultExt};
pub use pipeline::{
    ClosureProgressReporter, ContaminationExecutor, ContaminationStage, Contaminator,
    ContaminatorBuilder, ProgressReporter, ProgressUpdate, contaminate, contaminate_table,
};
pub use sampling::{SamplingMode, dimensions, sample_cells, select_columns};
pub use types::{
    CellCoord, CellSet, ColumnRef, ContaminationAction, ContaminationResult,
    ContaminationSummary, CorruptionLevel, OperatorKind, RefForm, Table, TableInput, TypeFilter,
};
pub use utils::ColumnKind;
