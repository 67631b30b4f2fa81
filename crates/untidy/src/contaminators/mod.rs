//! Contamination operators.
//!
//! Each operator takes a table and a corruption level, clones the table and
//! returns a contaminated copy. The input is never modified.
//!
//! - [`add_missing_values`] - replace cells with nulls or a `"?"` marker
//! - [`add_outliers`] - scale numeric cells far outside their column range
//! - [`add_noise_to_strings`] - append punctuation noise to text cells
//! - [`change_numeric_to_str`] - cast numeric columns to text
//! - [`change_str_encoding`] - turn text columns into raw bytes
//! - [`add_duplicate_rows`] / [`add_duplicate_columns`] - append copies
//!
//! Cell-level operators also have a single-column twin that works on a
//! [`Series`](polars::prelude::Series).

mod coercion;
mod duplication;
mod encoding;
mod missing;
mod noise;
mod outliers;

pub use coercion::change_numeric_to_str;
pub use duplication::{add_duplicate_columns, add_duplicate_rows, duplicate_count};
pub use encoding::{TextEncoding, change_str_encoding};
pub use missing::{
    MISSING_MARKER, MissingMarkerPolicy, NULL_PROBABILITY, add_missing_values,
    add_missing_values_to_series, add_missing_values_with,
};
pub use noise::{NOISE_TOKENS, add_noise_to_series, add_noise_to_strings, add_noise_to_strings_with};
pub use outliers::{add_outliers, add_outliers_to_series, add_outliers_with, outlier_factor};

pub(crate) use coercion::change_numeric_to_str_counted;
pub(crate) use encoding::change_str_encoding_counted;
pub(crate) use missing::add_missing_values_counted;
pub(crate) use noise::add_noise_to_strings_counted;
pub(crate) use outliers::add_outliers_counted;

use crate::sampling::DEFAULT_MAX_CELL_PERCENT;
use serde::{Deserialize, Serialize};

/// Tuning shared by the cell-level operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorOptions {
    /// Percentage of eligible cells touched at level 10.
    pub max_cell_percent: u8,
    /// Where the `"?"` marker may stand in for a null.
    pub missing_marker_policy: MissingMarkerPolicy,
}

impl Default for OperatorOptions {
    fn default() -> Self {
        Self {
            max_cell_percent: DEFAULT_MAX_CELL_PERCENT,
            missing_marker_policy: MissingMarkerPolicy::default(),
        }
    }
}
