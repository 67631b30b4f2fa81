//! Missing value injection.

use super::OperatorOptions;
use crate::error::{Result, ResultExt};
use crate::sampling::sample_cells;
use crate::types::{CorruptionLevel, TableInput, TypeFilter};
use crate::utils::{ColumnKind, null_out_rows, rows_by_column, series_kind, series_to_strings};
use polars::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chance that a touched cell becomes a real null rather than the marker.
pub const NULL_PROBABILITY: f64 = 0.9;

/// Placeholder written instead of a null.
pub const MISSING_MARKER: &str = "?";

/// Which columns may receive the [`MISSING_MARKER`] instead of a null.
///
/// Writing the marker into a column turns it into a text column, so the
/// policy also decides which columns may change type. Categorical and
/// other non-text columns only ever receive nulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMarkerPolicy {
    /// Text and numeric columns may receive the marker.
    #[default]
    TextAndNumeric,
    /// Only text columns may receive the marker.
    TextOnly,
    /// Never write the marker.
    NullOnly,
}

impl MissingMarkerPolicy {
    pub fn allows_text_marker(self, kind: ColumnKind) -> bool {
        match (self, kind) {
            (Self::NullOnly, _) => false,
            (_, ColumnKind::Text) => true,
            (Self::TextAndNumeric, ColumnKind::Numeric) => true,
            _ => false,
        }
    }
}

/// Replace a level-scaled share of cells with missing values.
pub fn add_missing_values<R>(df: &DataFrame, level: CorruptionLevel, rng: &mut R) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    add_missing_values_with(df, level, &OperatorOptions::default(), rng)
}

/// Same as [`add_missing_values`] with explicit options.
pub fn add_missing_values_with<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    options: &OperatorOptions,
    rng: &mut R,
) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    add_missing_values_counted(df, level, options, rng).map(|(out, _)| out)
}

/// [`add_missing_values_with`] plus the number of touched cells.
pub(crate) fn add_missing_values_counted<R>(
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
        TypeFilter::Any,
        level,
        options.max_cell_percent,
        rng,
    )?;

    let mut out = df.clone();
    let mut nulls = 0;
    let mut markers = 0;

    for (col_idx, rows) in rows_by_column(&cells) {
        let series = df.get_columns()[col_idx].as_materialized_series();
        let name = series.name().to_string();
        let allow_marker = options
            .missing_marker_policy
            .allows_text_marker(series_kind(series));

        let (null_rows, marker_rows) = split_rows(rows, allow_marker, rng);
        nulls += null_rows.len();
        markers += marker_rows.len();

        let updated = inject_missing(series, &null_rows, &marker_rows)
            .context(format!("Failed to add missing values to '{}'", name))?;
        out.replace(&name, updated)?;
    }

    debug!(
        "Added {} nulls and {} '{}' markers at level {}",
        nulls, markers, MISSING_MARKER, level
    );
    Ok((out, nulls + markers))
}

/// Single-column variant of [`add_missing_values_with`].
pub fn add_missing_values_to_series<R>(
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
        TypeFilter::Any,
        level,
        options.max_cell_percent,
        rng,
    )?;
    let rows: Vec<usize> = cells.iter().map(|cell| cell.row).collect();
    let allow_marker = options
        .missing_marker_policy
        .allows_text_marker(series_kind(series));

    let (null_rows, marker_rows) = split_rows(rows, allow_marker, rng);
    Ok(inject_missing(series, &null_rows, &marker_rows)?)
}

/// Split touched rows into `(null_rows, marker_rows)`.
fn split_rows<R>(rows: Vec<usize>, allow_marker: bool, rng: &mut R) -> (Vec<usize>, Vec<usize>)
where
    R: Rng + ?Sized,
{
    rows.into_iter()
        .partition(|_| !allow_marker || rng.gen_bool(NULL_PROBABILITY))
}

fn inject_missing(
    series: &Series,
    null_rows: &[usize],
    marker_rows: &[usize],
) -> PolarsResult<Series> {
    if marker_rows.is_empty() {
        return null_out_rows(series, null_rows);
    }

    // The marker only fits in a text column
    let mut values = series_to_strings(series)?;
    for &row in null_rows {
        values[row] = None;
    }
    for &row in marker_rows {
        values[row] = Some(MISSING_MARKER.to_string());
    }
    Ok(Series::new(series.name().clone(), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::count_nulls;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_data() -> DataFrame {
        let num1: Vec<f64> = (0..21).map(f64::from).collect();
        let num2: Vec<i64> = (0..21).collect();
        let str1: Vec<String> = (0..21).map(|n| n.to_string()).collect();
        let str2: Vec<String> = num1.iter().map(|n| format!("{n:?}")).collect();
        df![
            "num1" => num1,
            "num2" => num2,
            "str1" => str1,
            "str2" => str2,
        ]
        .unwrap()
    }

    fn level(value: u8) -> CorruptionLevel {
        CorruptionLevel::new(value).unwrap()
    }

    /// Count cells that differ between two frames of the same shape.
    fn changed_cells(before: &DataFrame, after: &DataFrame) -> Vec<(usize, usize)> {
        let mut changed = Vec::new();
        for (col_idx, (a, b)) in before
            .get_columns()
            .iter()
            .zip(after.get_columns())
            .enumerate()
        {
            let a = series_to_strings(a.as_materialized_series()).unwrap();
            let b = series_to_strings(b.as_materialized_series()).unwrap();
            for (row, (x, y)) in a.iter().zip(&b).enumerate() {
                if x != y {
                    changed.push((row, col_idx));
                }
            }
        }
        changed
    }

    #[test]
    fn test_missing_policy() {
        let policy = MissingMarkerPolicy::TextAndNumeric;
        assert!(policy.allows_text_marker(ColumnKind::Text));
        assert!(policy.allows_text_marker(ColumnKind::Numeric));
        assert!(!policy.allows_text_marker(ColumnKind::Categorical));
        assert!(!policy.allows_text_marker(ColumnKind::Other));

        assert!(!MissingMarkerPolicy::TextOnly.allows_text_marker(ColumnKind::Numeric));
        assert!(!MissingMarkerPolicy::NullOnly.allows_text_marker(ColumnKind::Text));
    }

    #[test]
    fn test_level_zero_is_identity() {
        let df = sample_data();
        let mut rng = StdRng::seed_from_u64(1);
        let result = add_missing_values(&df, level(0), &mut rng).unwrap();
        assert_eq!(result, df);
    }

    #[test]
    fn test_shape_preserved_and_cells_missing() {
        let df = sample_data();
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = add_missing_values(&df, level(6), &mut rng).unwrap();
            assert_eq!(result.shape(), df.shape());

            let changed = changed_cells(&df, &result);
            assert!(!changed.is_empty());
            for (row, col) in changed {
                let value = result.get_columns()[col].get(row).unwrap();
                let is_marker = matches!(value, AnyValue::String(s) if s == MISSING_MARKER);
                assert!(value.is_null() || is_marker, "unexpected value {value:?}");
            }
        }
    }

    #[test]
    fn test_input_not_modified() {
        let df = sample_data();
        let copy = df.clone();
        let mut rng = StdRng::seed_from_u64(2);
        let _ = add_missing_values(&df, level(10), &mut rng).unwrap();
        assert_eq!(df, copy);
    }

    #[test]
    fn test_null_only_keeps_dtypes() {
        let df = sample_data();
        let options = OperatorOptions {
            missing_marker_policy: MissingMarkerPolicy::NullOnly,
            ..OperatorOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let result = add_missing_values_with(&df, level(10), &options, &mut rng).unwrap();

        assert_eq!(result.dtypes(), df.dtypes());
        assert!(count_nulls(&result) > 0);
    }

    #[test]
    fn test_marker_never_in_categorical_column() {
        let df = df![
            "cat" => ["a", "b", "c", "a", "b", "c", "a", "b", "c", "a"],
        ]
        .unwrap();
        let mut df = df;
        let cat_dtype = DataType::from_categories(Categories::global());
        let cat = df.column("cat").unwrap().cast(&cat_dtype).unwrap();
        df.replace("cat", cat.take_materialized_series()).unwrap();

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = add_missing_values(&df, level(10), &mut rng).unwrap();
            let column = result.column("cat").unwrap();
            assert!(matches!(column.dtype(), DataType::Categorical(..)));
        }
    }

    #[test]
    fn test_series_variant() {
        let series = Series::new("n".into(), (0..50).collect::<Vec<i64>>());
        let options = OperatorOptions {
            missing_marker_policy: MissingMarkerPolicy::NullOnly,
            ..OperatorOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let result = add_missing_values_to_series(&series, level(10), &options, &mut rng).unwrap();

        assert_eq!(result.len(), 50);
        assert_eq!(result.dtype(), &DataType::Int64);
        // Rows are drawn without replacement for a single column
        assert_eq!(result.null_count(), 30);
    }

    #[test]
    fn test_inject_missing_with_marker() {
        let series = Series::new("n".into(), &[1i64, 2, 3, 4]);
        let result = inject_missing(&series, &[0], &[2]).unwrap();
        let values: Vec<Option<&str>> = result.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![None, Some("2"), Some("?"), Some("4")]);
    }
}
