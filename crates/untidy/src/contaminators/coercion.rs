//! Numeric-to-text type coercion.

use crate::error::{Result, ResultExt};
use crate::sampling::{SamplingMode, select_column_indices};
use crate::types::{CorruptionLevel, TypeFilter};
use polars::prelude::*;
use rand::Rng;
use std::collections::BTreeSet;
use tracing::debug;

/// Cast a level-scaled number of numeric columns to `String`.
///
/// Columns are picked with replacement, so fewer distinct columns than the
/// target count may change. Text and other columns are never touched.
pub fn change_numeric_to_str<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    rng: &mut R,
) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    change_numeric_to_str_counted(df, level, rng).map(|(out, _)| out)
}

/// [`change_numeric_to_str`] plus the number of cast columns.
pub(crate) fn change_numeric_to_str_counted<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    rng: &mut R,
) -> Result<(DataFrame, usize)>
where
    R: Rng + ?Sized,
{
    let picks: BTreeSet<usize> = select_column_indices(
        df,
        TypeFilter::Numeric,
        level,
        SamplingMode::WithReplacement,
        rng,
    )?
    .into_iter()
    .collect();

    let mut out = df.clone();
    for &col_idx in &picks {
        let column = &df.get_columns()[col_idx];
        let name = column.name().to_string();
        let as_text = column
            .cast(&DataType::String)
            .context(format!("Failed to cast '{}' to text", name))?;
        out.replace(&name, as_text.take_materialized_series())?;
    }

    debug!("Changed {} numeric columns to text", picks.len());
    Ok((out, picks.len()))
}
