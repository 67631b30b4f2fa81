//! Pipeline module.
//!
//! This module provides the contamination pipeline and related components.

mod builder;
mod executor;
pub mod progress;

pub use builder::{Contaminator, ContaminatorBuilder};
pub use executor::{ContaminationExecutor, contaminate, contaminate_table};
pub use progress::{ClosureProgressReporter, ContaminationStage, ProgressReporter, ProgressUpdate};
