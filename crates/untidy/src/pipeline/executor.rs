//! Contamination executor module.
//!
//! Dispatches an [`OperatorKind`] to its operator and runs an ordered list
//! of operators over one working copy of the table.

use crate::config::OperatorFlags;
use crate::contaminators::{
    OperatorOptions, add_duplicate_columns, add_duplicate_rows, add_missing_values_counted,
    add_missing_values_to_series, add_noise_to_series, add_noise_to_strings_counted,
    add_outliers_counted, add_outliers_to_series, change_numeric_to_str_counted,
    change_str_encoding_counted,
};
use crate::error::{ContaminationError, Result, ResultExt};
use crate::sampling::dimensions;
use crate::types::{ContaminationAction, CorruptionLevel, OperatorKind, Table};
use polars::prelude::*;
use rand::Rng;
use tracing::debug;

/// Executes contamination operators on a DataFrame.
pub struct ContaminationExecutor;

impl ContaminationExecutor {
    /// Run a single operator on `df`, returning the contaminated copy.
    pub fn apply<R>(
        operator: OperatorKind,
        df: &DataFrame,
        level: CorruptionLevel,
        options: &OperatorOptions,
        rng: &mut R,
    ) -> Result<DataFrame>
    where
        R: Rng + ?Sized,
    {
        Self::apply_counted(operator, df, level, options, rng).map(|(out, _)| out)
    }

    /// Run a single operator and count the cells, columns or rows it
    /// touched (see [`OperatorKind::touched_unit`]).
    fn apply_counted<R>(
        operator: OperatorKind,
        df: &DataFrame,
        level: CorruptionLevel,
        options: &OperatorOptions,
        rng: &mut R,
    ) -> Result<(DataFrame, usize)>
    where
        R: Rng + ?Sized,
    {
        match operator {
            OperatorKind::Outliers => add_outliers_counted(df, level, options, rng),
            OperatorKind::TextNoise => add_noise_to_strings_counted(df, level, options, rng),
            OperatorKind::EncodingChange => change_str_encoding_counted(df, level, rng),
            OperatorKind::NumericToText => change_numeric_to_str_counted(df, level, rng),
            OperatorKind::MissingValues => add_missing_values_counted(df, level, options, rng),
            OperatorKind::DuplicateRows => {
                let out = add_duplicate_rows(df, level, rng)?;
                let added = out.height() - df.height();
                Ok((out, added))
            }
            OperatorKind::DuplicateColumns => {
                let out = add_duplicate_columns(df, level, rng)?;
                let added = out.width() - df.width();
                Ok((out, added))
            }
        }
    }

    /// Run a single operator on a table or a lone column.
    ///
    /// Cell-level operators work on a lone column directly, drawing rows
    /// without replacement. The other operators see it as a one-column
    /// table; duplicating its only column turns it into a table.
    pub fn apply_to_table<R>(
        operator: OperatorKind,
        table: &Table,
        level: CorruptionLevel,
        options: &OperatorOptions,
        rng: &mut R,
    ) -> Result<Table>
    where
        R: Rng + ?Sized,
    {
        debug!(
            "{} on {:?} input",
            operator.display_name(),
            dimensions(table.as_input())
        );

        let series = match table {
            Table::Frame(df) => {
                return Self::apply(operator, df, level, options, rng).map(Table::Frame);
            }
            Table::Column(series) => series,
        };

        match operator {
            OperatorKind::Outliers => {
                add_outliers_to_series(series, level, options, rng).map(Table::Column)
            }
            OperatorKind::TextNoise => {
                add_noise_to_series(series, level, options, rng).map(Table::Column)
            }
            OperatorKind::MissingValues => {
                add_missing_values_to_series(series, level, options, rng).map(Table::Column)
            }
            _ => {
                let df = DataFrame::new(vec![series.clone().into_column()])
                    .map_err(|e| ContaminationError::InvalidInputKind(e.to_string()))?;
                let out = Self::apply(operator, &df, level, options, rng)?;
                Table::from_columns(out.take_columns())
            }
        }
    }

    /// Run `operators` in order, threading one working copy through them.
    ///
    /// `on_step` is called after every operator with its action record. The
    /// first failure aborts the run and is returned with the operator's name
    /// as context.
    pub fn run<R, F>(
        df: &DataFrame,
        operators: &[OperatorKind],
        level: CorruptionLevel,
        options: &OperatorOptions,
        rng: &mut R,
        mut on_step: F,
    ) -> Result<DataFrame>
    where
        R: Rng + ?Sized,
        F: FnMut(usize, ContaminationAction),
    {
        let mut current = df.clone();
        for (step, &operator) in operators.iter().enumerate() {
            let (next, touched) = Self::apply_counted(operator, &current, level, options, rng)
                .context(operator.display_name())?;

            let action = ContaminationAction::between(operator, &current, &next, touched);
            debug!(
                "{}: {} {} touched, shape {:?} -> {:?}, nulls {} -> {}",
                operator.display_name(),
                action.touched,
                operator.touched_unit(),
                action.shape_before,
                action.shape_after,
                action.nulls_before,
                action.nulls_after
            );
            on_step(step, action);
            current = next;
        }
        Ok(current)
    }
}

/// Contaminate `df` with every operator enabled in `flags`, in pipeline
/// order, using default operator options.
///
/// This is the one-call form of [`Contaminator`](super::Contaminator) for
/// callers that bring their own random source.
pub fn contaminate<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    flags: &OperatorFlags,
    rng: &mut R,
) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    ContaminationExecutor::run(
        df,
        &flags.enabled(),
        level,
        &OperatorOptions::default(),
        rng,
        |_, _| {},
    )
}

/// [`contaminate`] for a table or a lone column.
pub fn contaminate_table<R>(
    table: Table,
    level: CorruptionLevel,
    flags: &OperatorFlags,
    rng: &mut R,
) -> Result<Table>
where
    R: Rng + ?Sized,
{
    let options = OperatorOptions::default();
    flags.enabled().into_iter().try_fold(table, |current, operator| {
        ContaminationExecutor::apply_to_table(operator, &current, level, &options, rng)
            .context(operator.display_name())
    })
}
