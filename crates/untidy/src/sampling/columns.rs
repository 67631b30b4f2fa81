//! Column selection by type filter.

use super::{SamplingMode, sample_indices};
use crate::error::{ContaminationError, Result};
use crate::types::{ColumnRef, CorruptionLevel, RefForm, TypeFilter};
use crate::utils::{column_kind, scaled_ceil};
use polars::prelude::*;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Positions of the columns that pass `filter`, in table order.
pub fn eligible_columns(df: &DataFrame, filter: TypeFilter) -> Vec<usize> {
    df.get_columns()
        .iter()
        .enumerate()
        .filter(|(_, col)| filter.matches(column_kind(col.dtype())))
        .map(|(idx, _)| idx)
        .collect()
}

/// Number of columns to pick: grows linearly from 0 at level 0 to half of
/// the eligible columns at level 10, rounded up.
pub fn column_target_count(eligible: usize, level: CorruptionLevel) -> usize {
    scaled_ceil(eligible, level, 1, 2)
}

/// Draw `count` columns out of `eligible`.
///
/// An empty `eligible` list with a non-zero `count` fails with
/// `EmptyEligibleSet` rather than picking outside the filter.
pub fn sample_columns<R>(
    eligible: &[usize],
    count: usize,
    filter: TypeFilter,
    mode: SamplingMode,
    rng: &mut R,
) -> Result<Vec<usize>>
where
    R: Rng + ?Sized,
{
    if count == 0 {
        return Ok(Vec::new());
    }
    if eligible.is_empty() {
        return Err(ContaminationError::EmptyEligibleSet {
            filter: filter.to_string(),
            requested: count,
        });
    }

    let picks = sample_indices(eligible.len(), count, mode, rng)?;
    Ok(picks.into_iter().map(|i| eligible[i]).collect())
}

/// Pick column positions matching `filter`, scaled by `level`.
///
/// Returns an empty list when nothing matches, since the target count of
/// an empty population is always zero.
pub fn select_column_indices<R>(
    df: &DataFrame,
    filter: TypeFilter,
    level: CorruptionLevel,
    mode: SamplingMode,
    rng: &mut R,
) -> Result<Vec<usize>>
where
    R: Rng + ?Sized,
{
    let eligible = eligible_columns(df, filter);
    let count = column_target_count(eligible.len(), level);
    let picks = sample_columns(&eligible, count, filter, mode, rng)?;

    debug!(
        "Selected {} of {} {} columns at level {}",
        picks.len(),
        eligible.len(),
        filter,
        level
    );
    Ok(picks)
}

/// Pick columns matching `filter`, with replacement, as references of
/// the requested form.
///
/// The same column may come back more than once; pass the result through
/// [`dedup_refs`] when a unique list is needed.
pub fn select_columns<R>(
    df: &DataFrame,
    filter: TypeFilter,
    level: CorruptionLevel,
    form: RefForm,
    rng: &mut R,
) -> Result<Vec<ColumnRef>>
where
    R: Rng + ?Sized,
{
    select_column_indices(df, filter, level, SamplingMode::WithReplacement, rng)?
        .into_iter()
        .map(|idx| ColumnRef::from_index(df, idx, form))
        .collect()
}

/// Remove repeated references, keeping first occurrences in order.
pub fn dedup_refs(refs: Vec<ColumnRef>) -> Vec<ColumnRef> {
    let mut seen = HashSet::new();
    refs.into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_eligible_columns() {
        let df = sample_data();
        assert_eq!(eligible_columns(&df, TypeFilter::Text), vec![2, 3]);
        assert_eq!(eligible_columns(&df, TypeFilter::Numeric), vec![0, 1]);
        assert_eq!(eligible_columns(&df, TypeFilter::Any), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_column_target_count() {
        assert_eq!(column_target_count(2, level(0)), 0);
        assert_eq!(column_target_count(2, level(1)), 1);
        assert_eq!(column_target_count(2, level(10)), 1);
        assert_eq!(column_target_count(7, level(10)), 4);
        assert_eq!(column_target_count(0, level(10)), 0);
    }

    #[test]
    fn test_select_text_columns_by_name() {
        let df = sample_data();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked =
                select_columns(&df, TypeFilter::Text, level(4), RefForm::Name, &mut rng).unwrap();
            assert!(
                picked == vec![ColumnRef::Name("str1".to_string())]
                    || picked == vec![ColumnRef::Name("str2".to_string())],
                "got {picked:?}"
            );
        }
    }

    #[test]
    fn test_select_numeric_columns_by_index() {
        let df = sample_data();
        let mut rng = StdRng::seed_from_u64(3);
        let picked =
            select_columns(&df, TypeFilter::Numeric, level(4), RefForm::Index, &mut rng).unwrap();
        assert!(picked == vec![ColumnRef::Index(0)] || picked == vec![ColumnRef::Index(1)]);
    }

    #[test]
    fn test_select_with_no_eligible_columns_is_noop() {
        let df = df!["s" => ["a", "b"]].unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let picked = select_column_indices(
            &df,
            TypeFilter::Numeric,
            level(10),
            SamplingMode::WithReplacement,
            &mut rng,
        )
        .unwrap();
        assert!(picked.is_empty());
    }

    #[test]
    fn test_sample_columns_empty_eligible_set() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = sample_columns(
            &[],
            2,
            TypeFilter::Numeric,
            SamplingMode::WithReplacement,
            &mut rng,
        );
        assert!(matches!(
            result,
            Err(ContaminationError::EmptyEligibleSet { requested: 2, .. })
        ));
    }

    #[test]
    fn test_sample_columns_with_replacement_may_repeat() {
        let mut rng = StdRng::seed_from_u64(11);
        let picks = sample_columns(
            &[4],
            3,
            TypeFilter::Any,
            SamplingMode::WithReplacement,
            &mut rng,
        )
        .unwrap();
        assert_eq!(picks, vec![4, 4, 4]);
    }

    #[test]
    fn test_dedup_refs() {
        let refs = vec![
            ColumnRef::Index(2),
            ColumnRef::Index(0),
            ColumnRef::Index(2),
        ];
        assert_eq!(dedup_refs(refs), vec![ColumnRef::Index(2), ColumnRef::Index(0)]);
    }
}
