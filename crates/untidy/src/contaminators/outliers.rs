//! Outlier injection for numeric columns.
//!
//! A touched cell is multiplied by `10^(magnitude + 2)`, where `magnitude`
//! is the order of magnitude of the column's `max - min` range measured
//! before contamination. Signs are kept, zero becomes `+factor` and nulls
//! stay null. Integer columns keep their dtype; results beyond the dtype's
//! range saturate at its bounds, and a sampled cell already sitting at the
//! bound it would grow towards is left as is and not counted.

use super::OperatorOptions;
use crate::error::{Result, ResultExt};
use crate::sampling::sample_cells;
use crate::types::{CorruptionLevel, TableInput, TypeFilter};
use crate::utils::rows_by_column;
use polars::prelude::*;
use rand::Rng;
use tracing::debug;

/// Multiplier applied to outlier cells of `series`.
///
/// A column with fewer than two distinct values has no range and gets the
/// base factor of 100.
pub fn outlier_factor(series: &Series) -> PolarsResult<f64> {
    let values = series.cast(&DataType::Float64)?;
    let ca = values.f64()?;
    let magnitude = match (ca.min(), ca.max()) {
        (Some(min), Some(max)) if max > min => (max - min).log10().ceil().max(0.0),
        _ => 0.0,
    };
    Ok(10f64.powf(magnitude + 2.0))
}

/// Scale a level-scaled share of numeric cells into outliers.
pub fn add_outliers<R>(df: &DataFrame, level: CorruptionLevel, rng: &mut R) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    add_outliers_with(df, level, &OperatorOptions::default(), rng)
}

/// Same as [`add_outliers`] with explicit options.
pub fn add_outliers_with<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    options: &OperatorOptions,
    rng: &mut R,
) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    add_outliers_counted(df, level, options, rng).map(|(out, _)| out)
}

/// [`add_outliers_with`] plus the number of cells that changed.
pub(crate) fn add_outliers_counted<R>(
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
        TypeFilter::Numeric,
        level,
        options.max_cell_percent,
        rng,
    )?;

    let mut out = df.clone();
    let mut touched = 0;
    for (col_idx, rows) in rows_by_column(&cells) {
        let series = df.get_columns()[col_idx].as_materialized_series();
        let name = series.name().to_string();
        let (updated, changed) =
            inject_outliers(series, &rows).context(format!("Failed to add outliers to '{}'", name))?;
        touched += changed;
        out.replace(&name, updated)?;
    }

    debug!(
        "Turned {} of {} sampled numeric cells into outliers",
        touched,
        cells.len()
    );
    Ok((out, touched))
}

/// Single-column variant of [`add_outliers_with`].
///
/// A non-numeric column is returned unchanged.
pub fn add_outliers_to_series<R>(
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
        TypeFilter::Numeric,
        level,
        options.max_cell_percent,
        rng,
    )?;
    let rows: Vec<usize> = cells.iter().map(|cell| cell.row).collect();
    let (out, _) = inject_outliers(series, &rows)?;
    Ok(out)
}

/// Returns the new column and how many cells grew.
fn inject_outliers(series: &Series, rows: &[usize]) -> PolarsResult<(Series, usize)> {
    if rows.is_empty() {
        return Ok((series.clone(), 0));
    }

    let dtype = series.dtype().clone();
    let factor = outlier_factor(series)?;
    let bounds = integer_bounds(&dtype);

    let as_float = series.cast(&DataType::Float64)?;
    let mut scaled: Vec<Option<f64>> = as_float.f64()?.into_iter().collect();
    let len = series.len() as IdxSize;
    let mut picks: Vec<IdxSize> = (0..len).collect();
    let mut touched = 0;

    for &row in rows {
        let Some(value) = scaled[row] else {
            continue;
        };
        let outlier = if value == 0.0 { factor } else { value * factor };
        let outlier = match bounds {
            Some((lo, hi)) => outlier.clamp(lo, hi),
            None => outlier,
        };
        // Saturated at the bound already
        if outlier.abs() <= value.abs() {
            continue;
        }
        scaled[row] = Some(outlier);
        picks[row] += len;
        touched += 1;
    }

    // Untouched cells are gathered from the original column, so integers
    // wider than f64 precision stay exact.
    let scaled = Series::new(series.name().clone(), scaled).cast(&dtype)?;
    let mut combined = series.clone();
    combined.append(&scaled)?;
    let out = combined.take(&IdxCa::from_vec("picks".into(), picks))?;
    Ok((out, touched))
}

/// Largest and smallest values an integer dtype can hold, as floats that
/// cast back without overflow.
fn integer_bounds(dtype: &DataType) -> Option<(f64, f64)> {
    let bounds = match dtype {
        DataType::Int8 => (f64::from(i8::MIN), f64::from(i8::MAX)),
        DataType::Int16 => (f64::from(i16::MIN), f64::from(i16::MAX)),
        DataType::Int32 => (f64::from(i32::MIN), f64::from(i32::MAX)),
        DataType::Int64 => (i64::MIN as f64, (i64::MAX as f64).next_down()),
        DataType::UInt8 => (0.0, f64::from(u8::MAX)),
        DataType::UInt16 => (0.0, f64::from(u16::MAX)),
        DataType::UInt32 => (0.0, f64::from(u32::MAX)),
        DataType::UInt64 => (0.0, (u64::MAX as f64).next_down()),
        _ => return None,
    };
    Some(bounds)
}
