//! Row and column duplication.

use crate::error::{Result, ResultExt};
use crate::sampling::{SamplingMode, sample_indices};
use crate::types::CorruptionLevel;
use crate::utils::scaled_ceil;
use polars::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::debug;

/// Number of copies to add: `ceil(population × 0.2 × level / 10)`.
pub fn duplicate_count(population: usize, level: CorruptionLevel) -> usize {
    scaled_ceil(population, level, 1, 5)
}

/// Append copies of randomly chosen rows to the end of the table.
///
/// Rows are chosen without replacement; the original rows keep their
/// position and content.
pub fn add_duplicate_rows<R>(df: &DataFrame, level: CorruptionLevel, rng: &mut R) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    let count = duplicate_count(df.height(), level);
    if count == 0 {
        return Ok(df.clone());
    }

    let rows = sample_indices(df.height(), count, SamplingMode::WithoutReplacement, rng)?;
    let indices = IdxCa::from_vec(
        "rows".into(),
        rows.into_iter().map(|row| row as IdxSize).collect(),
    );
    let copies = df.take(&indices).context("Failed to copy rows")?;

    let mut out = df.clone();
    out.vstack_mut(&copies).context("Failed to append rows")?;

    debug!("Appended {} duplicate rows", count);
    Ok(out)
}

/// Append copies of randomly chosen columns, then shuffle the column order.
///
/// Each copy is named after its source plus random lowercase letters, with
/// letters added until the name is unused.
pub fn add_duplicate_columns<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    rng: &mut R,
) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    let count = duplicate_count(df.width(), level);
    if count == 0 {
        return Ok(df.clone());
    }

    let picks = sample_indices(df.width(), count, SamplingMode::WithoutReplacement, rng)?;
    let mut names: HashSet<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut columns = df.get_columns().to_vec();
    for idx in picks {
        let source = &df.get_columns()[idx];
        let name = unique_copy_name(source.name(), &mut names, rng);
        debug!("Duplicating column '{}' as '{}'", source.name(), name);
        columns.push(source.clone().with_name(name.into()));
    }
    columns.shuffle(rng);

    DataFrame::new(columns).context("Failed to rebuild table")
}

fn unique_copy_name<R>(base: &str, taken: &mut HashSet<String>, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let mut name = base.to_string();
    loop {
        name.push(char::from(b'a' + rng.gen_range(0..26u8)));
        if taken.insert(name.clone()) {
            return name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_duplicate_count() {
        assert_eq!(duplicate_count(21, level(0)), 0);
        assert_eq!(duplicate_count(21, level(1)), 1);
        assert_eq!(duplicate_count(21, level(10)), 5);
        assert_eq!(duplicate_count(10, level(5)), 1);
        assert_eq!(duplicate_count(4, level(10)), 1);
        assert_eq!(duplicate_count(0, level(10)), 0);
    }

    #[test]
    fn test_level_zero_is_identity() {
        let df = sample_data();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(add_duplicate_rows(&df, level(0), &mut rng).unwrap(), df);
        assert_eq!(add_duplicate_columns(&df, level(0), &mut rng).unwrap(), df);
    }

    #[test]
    fn test_duplicate_rows_growth() {
        let df = sample_data();
        for l in CorruptionLevel::all() {
            let mut rng = StdRng::seed_from_u64(u64::from(l.get()));
            let result = add_duplicate_rows(&df, l, &mut rng).unwrap();
            let expected = df.height() + duplicate_count(df.height(), l);
            assert_eq!(result.height(), expected);
            assert_eq!(result.width(), df.width());

            // Original rows unchanged and in place
            assert_eq!(result.head(Some(df.height())), df);
        }
    }

    #[test]
    fn test_duplicate_rows_are_copies() {
        let df = df!["id" => (0..10).collect::<Vec<i64>>()].unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let result = add_duplicate_rows(&df, level(10), &mut rng).unwrap();

        let ids: Vec<i64> = result
            .column("id")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        let appended = &ids[10..];
        assert_eq!(appended.len(), 2);
        assert_ne!(appended[0], appended[1]);
        assert!(appended.iter().all(|id| (0..10).contains(id)));
    }

    #[test]
    fn test_duplicate_columns_growth() {
        let df = sample_data();
        for l in CorruptionLevel::all() {
            let mut rng = StdRng::seed_from_u64(u64::from(l.get()));
            let result = add_duplicate_columns(&df, l, &mut rng).unwrap();
            let expected = df.width() + duplicate_count(df.width(), l);
            assert_eq!(result.width(), expected);
            assert_eq!(result.height(), df.height());

            // Every original column is still there, unchanged
            for column in df.get_columns() {
                let after = result.column(column.name()).unwrap();
                assert!(
                    after
                        .as_materialized_series()
                        .equals(column.as_materialized_series())
                );
            }
        }
    }

    #[test]
    fn test_duplicate_column_names() {
        let df = sample_data();
        let mut rng = StdRng::seed_from_u64(3);
        let result = add_duplicate_columns(&df, level(10), &mut rng).unwrap();

        let originals: HashSet<String> =
            df.get_column_names().iter().map(|n| n.to_string()).collect();
        for column in result.get_columns() {
            let name = column.name().to_string();
            if originals.contains(&name) {
                continue;
            }
            let source = originals
                .iter()
                .find(|orig| {
                    name.starts_with(orig.as_str())
                        && name[orig.len()..].chars().all(|c| c.is_ascii_lowercase())
                })
                .expect("copy should be named after its source");
            let expected = df.column(source).unwrap().as_materialized_series();
            assert!(column.as_materialized_series().equals(expected));
        }
    }

    #[test]
    fn test_unique_copy_name_skips_taken() {
        let mut taken: HashSet<String> = ["a".to_string()].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..30 {
            let name = unique_copy_name("a", &mut taken, &mut rng);
            assert!(name.len() >= 2);
        }
        assert_eq!(taken.len(), 31);
    }
}
