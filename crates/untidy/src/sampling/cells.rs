//! Cell coordinate sampling.

use super::columns::eligible_columns;
use super::{SamplingMode, sample_indices};
use crate::error::Result;
use crate::types::{CellCoord, CellSet, CorruptionLevel, TableInput, TypeFilter};
use crate::utils::{scaled_floor, series_kind};
use polars::prelude::*;
use rand::Rng;
use tracing::debug;

/// Share of the addressable cells touched at level 10, in percent.
pub const DEFAULT_MAX_CELL_PERCENT: u8 = 60;

/// `floor(level / 10 × max_cell_percent / 100 × total_cells)`.
pub fn cell_target_count(total_cells: usize, level: CorruptionLevel, max_cell_percent: u8) -> usize {
    scaled_floor(total_cells, level, usize::from(max_cell_percent), 100)
}

/// Pick the cells an operator should contaminate.
///
/// For a table, rows and eligible columns are drawn independently and
/// with replacement; repeated draws collapse in the set, so the result may
/// hold fewer coordinates than the target count. For a single column, the
/// target count of rows is drawn without replacement and the column
/// component is always 0.
pub fn sample_cells<R>(
    input: TableInput<'_>,
    filter: TypeFilter,
    level: CorruptionLevel,
    max_cell_percent: u8,
    rng: &mut R,
) -> Result<CellSet>
where
    R: Rng + ?Sized,
{
    match input {
        TableInput::Frame(df) => sample_frame_cells(df, filter, level, max_cell_percent, rng),
        TableInput::Column(series) => {
            sample_column_cells(series, filter, level, max_cell_percent, rng)
        }
    }
}

fn sample_frame_cells<R>(
    df: &DataFrame,
    filter: TypeFilter,
    level: CorruptionLevel,
    max_cell_percent: u8,
    rng: &mut R,
) -> Result<CellSet>
where
    R: Rng + ?Sized,
{
    let eligible = eligible_columns(df, filter);
    let total_cells = df.height() * eligible.len();
    let target = cell_target_count(total_cells, level, max_cell_percent);

    if target == 0 {
        return Ok(CellSet::new());
    }

    let rows = sample_indices(df.height(), target, SamplingMode::WithReplacement, rng)?;
    let cols = sample_indices(eligible.len(), target, SamplingMode::WithReplacement, rng)?;

    let cells: CellSet = rows
        .into_iter()
        .zip(cols)
        .map(|(row, col)| CellCoord::new(row, eligible[col]))
        .collect();

    debug!(
        "Sampled {} distinct cells (target {}) out of {} {} cells",
        cells.len(),
        target,
        total_cells,
        filter
    );
    Ok(cells)
}

fn sample_column_cells<R>(
    series: &Series,
    filter: TypeFilter,
    level: CorruptionLevel,
    max_cell_percent: u8,
    rng: &mut R,
) -> Result<CellSet>
where
    R: Rng + ?Sized,
{
    if !filter.matches(series_kind(series)) {
        return Ok(CellSet::new());
    }

    let target = cell_target_count(series.len(), level, max_cell_percent);
    let rows = sample_indices(series.len(), target, SamplingMode::WithoutReplacement, rng)?;

    Ok(rows.into_iter().map(|row| CellCoord::new(row, 0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_kind;
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

    #[test]
    fn test_cell_target_count() {
        assert_eq!(cell_target_count(84, level(0), 60), 0);
        assert_eq!(cell_target_count(84, level(10), 60), 50);
        assert_eq!(cell_target_count(42, level(4), 60), 10);
        assert_eq!(cell_target_count(84, level(10), 100), 84);
    }

    #[test]
    fn test_sample_text_cells_in_range() {
        let df = sample_data();
        let mut rng = StdRng::seed_from_u64(7);
        let cells = sample_cells(
            TableInput::Frame(&df),
            TypeFilter::Text,
            level(4),
            DEFAULT_MAX_CELL_PERCENT,
            &mut rng,
        )
        .unwrap();

        assert!(!cells.is_empty());
        assert!(cells.len() <= cell_target_count(42, level(4), DEFAULT_MAX_CELL_PERCENT));
        for cell in &cells {
            assert!(cell.row < df.height());
            let dtype = df.get_columns()[cell.col].dtype();
            assert!(TypeFilter::Text.matches(column_kind(dtype)));
        }
    }

    #[test]
    fn test_sample_numeric_cells_in_range() {
        let df = sample_data();
        let mut rng = StdRng::seed_from_u64(8);
        let cells = sample_cells(
            TableInput::Frame(&df),
            TypeFilter::Numeric,
            level(4),
            DEFAULT_MAX_CELL_PERCENT,
            &mut rng,
        )
        .unwrap();

        for cell in &cells {
            assert!(cell.row < df.height());
            assert!(cell.col < 2, "column {} is not numeric", cell.col);
        }
    }

    #[test]
    fn test_sample_cells_level_zero_is_empty() {
        let df = sample_data();
        let mut rng = StdRng::seed_from_u64(0);
        let cells = sample_cells(
            TableInput::Frame(&df),
            TypeFilter::Any,
            level(0),
            DEFAULT_MAX_CELL_PERCENT,
            &mut rng,
        )
        .unwrap();
        assert!(cells.is_empty());
    }

    #[test]
    fn test_sample_cells_no_eligible_columns() {
        let df = df!["n" => [1, 2, 3]].unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let cells = sample_cells(
            TableInput::Frame(&df),
            TypeFilter::Text,
            level(10),
            DEFAULT_MAX_CELL_PERCENT,
            &mut rng,
        )
        .unwrap();
        assert!(cells.is_empty());
    }

    #[test]
    fn test_sample_single_column_without_replacement() {
        let series = Series::new("n".into(), (0..50).collect::<Vec<i64>>());
        let mut rng = StdRng::seed_from_u64(5);
        let cells = sample_cells(
            TableInput::Column(&series),
            TypeFilter::Numeric,
            level(10),
            DEFAULT_MAX_CELL_PERCENT,
            &mut rng,
        )
        .unwrap();

        // No collisions when drawing without replacement
        assert_eq!(cells.len(), 30);
        assert!(cells.iter().all(|c| c.col == 0 && c.row < 50));
    }

    #[test]
    fn test_sample_single_column_filtered_out() {
        let series = Series::new("s".into(), &["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(5);
        let cells = sample_cells(
            TableInput::Column(&series),
            TypeFilter::Numeric,
            level(10),
            DEFAULT_MAX_CELL_PERCENT,
            &mut rng,
        )
        .unwrap();
        assert!(cells.is_empty());
    }
}
