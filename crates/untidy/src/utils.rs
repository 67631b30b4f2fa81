//! Shared utilities for the contamination operators.
//!
//! This module contains dtype classification, the level-to-count
//! arithmetic shared by the samplers and a few Series helpers.

use crate::types::CorruptionLevel;
use polars::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a column's element type for contamination purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Integer or floating point numbers
    Numeric,
    /// Free text
    Text,
    /// Categorical or enum values
    Categorical,
    /// Booleans, dates, binary and nested types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is categorical (including enums).
#[inline]
pub fn is_categorical_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Categorical(..) | DataType::Enum(..))
}

/// Get the kind of a DataType.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if matches!(dtype, DataType::String) {
        ColumnKind::Text
    } else if is_categorical_dtype(dtype) {
        ColumnKind::Categorical
    } else {
        ColumnKind::Other
    }
}

/// Get the kind of a Series.
pub fn series_kind(series: &Series) -> ColumnKind {
    column_kind(series.dtype())
}

// =============================================================================
// Level Arithmetic
// =============================================================================

/// Integer division rounding up.
#[inline]
pub fn ceil_div(numerator: usize, denominator: usize) -> usize {
    numerator.div_ceil(denominator)
}

/// `ceil(population × fraction × level / 10)` with `fraction = num / den`.
///
/// Done in integers so that exact multiples never round up by accident.
pub fn scaled_ceil(population: usize, level: CorruptionLevel, num: usize, den: usize) -> usize {
    ceil_div(
        population * usize::from(level.get()) * num,
        den * CorruptionLevel::STEPS,
    )
}

/// `floor(population × fraction × level / 10)` with `fraction = num / den`.
pub fn scaled_floor(population: usize, level: CorruptionLevel, num: usize, den: usize) -> usize {
    (population * usize::from(level.get()) * num) / (den * CorruptionLevel::STEPS)
}

// =============================================================================
// Series Utilities
// =============================================================================

/// Render every value of a Series as text, keeping nulls.
pub fn series_to_strings(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let as_text = series.cast(&DataType::String)?;
    Ok(as_text
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Replace the values at `rows` with nulls, keeping the dtype.
pub fn null_out_rows(series: &Series, rows: &[usize]) -> PolarsResult<Series> {
    if rows.is_empty() {
        return Ok(series.clone());
    }

    let mut keep = vec![true; series.len()];
    for &row in rows {
        keep[row] = false;
    }

    // A null gather index yields a null value.
    let indices = IdxCa::from_iter_options(
        "indices".into(),
        keep.iter()
            .enumerate()
            .map(|(i, &k)| k.then_some(i as IdxSize)),
    );
    series.take(&indices)
}

/// Group cell coordinates into `column -> rows`, both ascending.
pub fn rows_by_column<'a, I>(cells: I) -> BTreeMap<usize, Vec<usize>>
where
    I: IntoIterator<Item = &'a crate::types::CellCoord>,
{
    let mut grouped: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for cell in cells {
        grouped.entry(cell.col).or_default().push(cell.row);
    }
    grouped
}

/// Total number of null cells in a DataFrame.
pub fn count_nulls(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

// =============================================================================
// Tests
// =============================================================================
