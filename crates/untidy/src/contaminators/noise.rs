//! Punctuation noise for text columns.

use super::OperatorOptions;
use crate::error::{Result, ResultExt};
use crate::sampling::sample_cells;
use crate::types::{CorruptionLevel, TableInput, TypeFilter};
use crate::utils::{rows_by_column, series_to_strings};
use polars::prelude::*;
use rand::Rng;
use tracing::debug;

/// Tokens appended to a noisy cell, one per touched cell.
pub const NOISE_TOKENS: [&str; 7] = ["%", "&", "$", "?", "!", "#", "  "];

/// Append a noise token to a level-scaled share of text cells.
pub fn add_noise_to_strings<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    rng: &mut R,
) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    add_noise_to_strings_with(df, level, &OperatorOptions::default(), rng)
}

/// Same as [`add_noise_to_strings`] with explicit options.
pub fn add_noise_to_strings_with<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    options: &OperatorOptions,
    rng: &mut R,
) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    add_noise_to_strings_counted(df, level, options, rng).map(|(out, _)| out)
}

/// [`add_noise_to_strings_with`] plus the number of noisy cells.
pub(crate) fn add_noise_to_strings_counted<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    options: &OperatorOptions,
    rng: &mut R,
) -> Result<(DataFrame, usize)>
where
    R: Rng + ?Sized,
{
    let cells = sample_cells(
        TableInput::Frame(df),
        TypeFilter::Text,
        level,
        options.max_cell_percent,
        rng,
    )?;

    let mut out = df.clone();
    for (col_idx, rows) in rows_by_column(&cells) {
        let series = df.get_columns()[col_idx].as_materialized_series();
        let name = series.name().to_string();
        let updated = inject_noise(series, &rows, rng)
            .context(format!("Failed to add noise to '{}'", name))?;
        out.replace(&name, updated)?;
    }

    debug!("Added noise to {} text cells", cells.len());
    Ok((out, cells.len()))
}

/// Single-column variant of [`add_noise_to_strings_with`].
///
/// A column that is not text is returned unchanged.
pub fn add_noise_to_series<R>(
    series: &Series,
    level: CorruptionLevel,
    options: &OperatorOptions,
    rng: &mut R,
) -> Result<Series>
where
    R: Rng + ?Sized,
{
    let cells = sample_cells(
        TableInput::Column(series),
        TypeFilter::Text,
        level,
        options.max_cell_percent,
        rng,
    )?;
    let rows: Vec<usize> = cells.iter().map(|cell| cell.row).collect();
    Ok(inject_noise(series, &rows, rng)?)
}

fn inject_noise<R>(series: &Series, rows: &[usize], rng: &mut R) -> PolarsResult<Series>
where
    R: Rng + ?Sized,
{
    if rows.is_empty() {
        return Ok(series.clone());
    }

    let mut values = series_to_strings(series)?;
    for &row in rows {
        let token = NOISE_TOKENS[rng.gen_range(0..NOISE_TOKENS.len())];
        let mut value = values[row].take().unwrap_or_default();
        value.push_str(token);
        values[row] = Some(value);
    }

    let noisy = Series::new(series.name().clone(), values);
    match series.dtype() {
        // Categories grow to hold the new values; an enum's fixed set cannot
        dtype @ DataType::Categorical(..) => noisy.cast(dtype),
        _ => Ok(noisy),
    }
}
