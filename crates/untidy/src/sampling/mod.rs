//! Sampling module.
//!
//! Decides which parts of a table a contamination operator touches:
//!
//! - [`dimensions`] reports the shape of a table or a single column
//! - [`columns`] picks columns by type filter, scaled by corruption level
//! - [`cells`] picks (row, column) coordinates, scaled by corruption level

pub mod cells;
pub mod columns;
pub mod dimensions;

pub use cells::{DEFAULT_MAX_CELL_PERCENT, cell_target_count, sample_cells};
pub use columns::{
    column_target_count, dedup_refs, eligible_columns, sample_columns, select_column_indices,
    select_columns,
};
pub use dimensions::dimensions;

use crate::error::{ContaminationError, Result};
use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// Whether a draw may return the same item more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    #[default]
    WithReplacement,
    WithoutReplacement,
}

/// Draw `count` positions from `0..population`.
///
/// Without replacement the result holds distinct positions in random
/// order, and asking for more than the population fails with
/// `InsufficientPopulation`. With replacement any count is allowed as long
/// as the population is not empty.
pub fn sample_indices<R>(
    population: usize,
    count: usize,
    mode: SamplingMode,
    rng: &mut R,
) -> Result<Vec<usize>>
where
    R: Rng + ?Sized,
{
    if count == 0 {
        return Ok(Vec::new());
    }

    match mode {
        SamplingMode::WithReplacement => {
            if population == 0 {
                return Err(ContaminationError::InsufficientPopulation {
                    requested: count,
                    available: 0,
                });
            }
            Ok((0..count).map(|_| rng.gen_range(0..population)).collect())
        }
        SamplingMode::WithoutReplacement => {
            if count > population {
                return Err(ContaminationError::InsufficientPopulation {
                    requested: count,
                    available: population,
                });
            }
            Ok(index::sample(rng, population, count).into_vec())
        }
    }
}
