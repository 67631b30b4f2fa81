//! Shared domain types: corruption levels, type filters, column references,
//! table inputs, cell coordinates and the contamination summary.

use crate::error::{ContaminationError, Result};
use crate::utils::{ColumnKind, count_nulls};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Corruption Level
// ============================================================================

/// Intensity of a contamination pass, from 0 (no change) to 10 (maximum).
///
/// Every operator maps the level onto an effect size by linear
/// interpolation over the eleven discrete steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CorruptionLevel(u8);

impl CorruptionLevel {
    /// Level that leaves every table unchanged.
    pub const NONE: Self = Self(0);
    /// Highest supported level.
    pub const MAX: Self = Self(10);
    /// Number of discrete steps between `NONE` and `MAX`.
    pub const STEPS: usize = 10;

    /// Create a level, rejecting values above 10.
    pub fn new(level: u8) -> Result<Self> {
        if level > Self::MAX.0 {
            return Err(ContaminationError::InvalidCorruptionLevel(level));
        }
        Ok(Self(level))
    }

    /// Raw level value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Every level from 0 to 10, in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=Self::MAX.0).map(Self)
    }
}

impl Default for CorruptionLevel {
    fn default() -> Self {
        Self(4)
    }
}

impl TryFrom<u8> for CorruptionLevel {
    type Error = ContaminationError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CorruptionLevel> for u8 {
    fn from(level: CorruptionLevel) -> Self {
        level.0
    }
}

impl fmt::Display for CorruptionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Type Filter
// ============================================================================

/// Which columns an operator may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    /// Text and categorical columns.
    Text,
    /// Integer and floating point columns.
    Numeric,
    /// Every column.
    Any,
}

impl TypeFilter {
    /// Check whether a column of the given kind passes this filter.
    pub fn matches(self, kind: ColumnKind) -> bool {
        match self {
            Self::Text => matches!(kind, ColumnKind::Text | ColumnKind::Categorical),
            Self::Numeric => kind == ColumnKind::Numeric,
            Self::Any => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Numeric => "numeric",
            Self::Any => "any",
        }
    }
}

impl FromStr for TypeFilter {
    type Err = ContaminationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "str" | "string" | "text" => Ok(Self::Text),
            "num" | "numeric" => Ok(Self::Numeric),
            "any" | "all" => Ok(Self::Any),
            other => Err(ContaminationError::UnknownTypeFilter(other.to_string())),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Column References
// ============================================================================

/// Identifies a column by position or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

/// Form in which a selector returns its column references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefForm {
    #[default]
    Index,
    Name,
}

impl ColumnRef {
    /// Resolve to a 0-based position in `df`.
    pub fn resolve_index(&self, df: &DataFrame) -> Result<usize> {
        match self {
            Self::Index(idx) if *idx < df.width() => Ok(*idx),
            Self::Index(idx) => Err(ContaminationError::ColumnNotFound(format!("#{idx}"))),
            Self::Name(name) => df
                .get_column_index(name)
                .ok_or_else(|| ContaminationError::ColumnNotFound(name.clone())),
        }
    }

    /// Resolve to the column name in `df`.
    pub fn resolve_name(&self, df: &DataFrame) -> Result<String> {
        let idx = self.resolve_index(df)?;
        Ok(df.get_columns()[idx].name().to_string())
    }

    /// Build a reference of the requested form for the column at `idx`.
    pub fn from_index(df: &DataFrame, idx: usize, form: RefForm) -> Result<Self> {
        let reference = Self::Index(idx);
        match form {
            RefForm::Index => reference.resolve_index(df).map(Self::Index),
            RefForm::Name => reference.resolve_name(df).map(Self::Name),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(idx) => write!(f, "#{idx}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

// ============================================================================
// Table Input
// ============================================================================

/// Borrowed view of the data a sampler works on: a whole table or one column.
#[derive(Debug, Clone, Copy)]
pub enum TableInput<'a> {
    Frame(&'a DataFrame),
    Column(&'a Series),
}

impl<'a> From<&'a DataFrame> for TableInput<'a> {
    fn from(df: &'a DataFrame) -> Self {
        Self::Frame(df)
    }
}

impl<'a> From<&'a Series> for TableInput<'a> {
    fn from(series: &'a Series) -> Self {
        Self::Column(series)
    }
}

/// Owned table or single column, built from loose columns.
#[derive(Debug, Clone)]
pub enum Table {
    Frame(DataFrame),
    Column(Series),
}

impl Table {
    /// Assemble loose columns into a table.
    ///
    /// One column gives [`Table::Column`], more give [`Table::Frame`].
    /// An empty list, ragged lengths or duplicate names are neither a
    /// table nor a column and fail with `InvalidInputKind`.
    pub fn from_columns(mut columns: Vec<Column>) -> Result<Self> {
        match columns.len() {
            0 => Err(ContaminationError::InvalidInputKind(
                "expected a table or a single column, got no columns".to_string(),
            )),
            1 => {
                let column = columns.remove(0);
                Ok(Self::Column(column.take_materialized_series()))
            }
            _ => DataFrame::new(columns)
                .map(Self::Frame)
                .map_err(|e| ContaminationError::InvalidInputKind(e.to_string())),
        }
    }

    pub fn as_input(&self) -> TableInput<'_> {
        match self {
            Self::Frame(df) => TableInput::Frame(df),
            Self::Column(series) => TableInput::Column(series),
        }
    }
}

// ============================================================================
// Cell Coordinates
// ============================================================================

/// A (row, column) position in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Unique cell coordinates, ordered by row then column.
pub type CellSet = BTreeSet<CellCoord>;

// ============================================================================
// Operators
// ============================================================================

/// The corruption operators, listed in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Outliers,
    TextNoise,
    EncodingChange,
    NumericToText,
    MissingValues,
    DuplicateRows,
    DuplicateColumns,
}

impl OperatorKind {
    /// Fixed execution order of the pipeline.
    pub const PIPELINE_ORDER: [OperatorKind; 7] = [
        Self::Outliers,
        Self::TextNoise,
        Self::EncodingChange,
        Self::NumericToText,
        Self::MissingValues,
        Self::DuplicateRows,
        Self::DuplicateColumns,
    ];

    /// Returns a human-readable name for the operator.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Outliers => "Adding outliers",
            Self::TextNoise => "Adding noise to strings",
            Self::EncodingChange => "Changing string encoding",
            Self::NumericToText => "Changing numeric columns to strings",
            Self::MissingValues => "Adding missing values",
            Self::DuplicateRows => "Duplicating rows",
            Self::DuplicateColumns => "Duplicating columns",
        }
    }

    /// What [`ContaminationAction::touched`] counts for this operator.
    pub fn touched_unit(&self) -> &'static str {
        match self {
            Self::Outliers | Self::TextNoise | Self::MissingValues => "cells",
            Self::EncodingChange | Self::NumericToText | Self::DuplicateColumns => "columns",
            Self::DuplicateRows => "rows",
        }
    }
}

// ============================================================================
// Contamination Summary
// ============================================================================

/// What one operator run did: how much it touched, plus shape and null
/// counts around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminationAction {
    pub operator: OperatorKind,
    /// Cells, columns or rows changed or added, per [`OperatorKind::touched_unit`].
    pub touched: usize,
    pub shape_before: (usize, usize),
    pub shape_after: (usize, usize),
    pub nulls_before: usize,
    pub nulls_after: usize,
    /// Columns whose dtype differs after the operator ran.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub retyped_columns: Vec<String>,
}

impl ContaminationAction {
    /// Compare a table before and after an operator that touched `touched` units.
    pub fn between(
        operator: OperatorKind,
        before: &DataFrame,
        after: &DataFrame,
        touched: usize,
    ) -> Self {
        let retyped_columns = before
            .get_columns()
            .iter()
            .filter_map(|col| {
                let changed = after
                    .column(col.name())
                    .map(|other| other.dtype() != col.dtype())
                    .unwrap_or(false);
                changed.then(|| col.name().to_string())
            })
            .collect();

        Self {
            operator,
            touched,
            shape_before: before.shape(),
            shape_after: after.shape(),
            nulls_before: count_nulls(before),
            nulls_after: count_nulls(after),
            retyped_columns,
        }
    }

    pub fn rows_added(&self) -> usize {
        self.shape_after.0.saturating_sub(self.shape_before.0)
    }

    pub fn columns_added(&self) -> usize {
        self.shape_after.1.saturating_sub(self.shape_before.1)
    }

    pub fn nulls_added(&self) -> usize {
        self.nulls_after.saturating_sub(self.nulls_before)
    }
}

/// What a pipeline run did to the table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContaminationSummary {
    pub corruption_level: CorruptionLevel,
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
    pub shape_before: (usize, usize),
    pub shape_after: (usize, usize),
    pub actions: Vec<ContaminationAction>,
    /// Operators disabled by configuration.
    pub skipped: Vec<OperatorKind>,
}

impl ContaminationSummary {
    pub fn new(corruption_level: CorruptionLevel, shape_before: (usize, usize)) -> Self {
        Self {
            corruption_level,
            shape_before,
            shape_after: shape_before,
            ..Self::default()
        }
    }

    pub fn add_action(&mut self, action: ContaminationAction) {
        self.shape_after = action.shape_after;
        self.actions.push(action);
    }

    /// Operators that ran, in order.
    pub fn applied(&self) -> Vec<OperatorKind> {
        self.actions.iter().map(|a| a.operator).collect()
    }
}

/// Output of a pipeline run.
#[derive(Debug, Clone)]
pub struct ContaminationResult {
    pub data: DataFrame,
    pub summary: ContaminationSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_level_bounds() {
        assert!(CorruptionLevel::new(0).is_ok());
        assert!(CorruptionLevel::new(10).is_ok());
        assert!(matches!(
            CorruptionLevel::new(11),
            Err(ContaminationError::InvalidCorruptionLevel(11))
        ));
        assert_eq!(CorruptionLevel::default().get(), 4);
        assert_eq!(CorruptionLevel::all().count(), 11);
    }

    #[test]
    fn test_corruption_level_serde() {
        let level: CorruptionLevel = serde_json::from_str("7").unwrap();
        assert_eq!(level.get(), 7);
        assert!(serde_json::from_str::<CorruptionLevel>("42").is_err());
        assert_eq!(serde_json::to_string(&level).unwrap(), "7");
    }

    #[test]
    fn test_type_filter_parse() {
        assert_eq!("str".parse::<TypeFilter>().unwrap(), TypeFilter::Text);
        assert_eq!("NUM".parse::<TypeFilter>().unwrap(), TypeFilter::Numeric);
        assert_eq!("all".parse::<TypeFilter>().unwrap(), TypeFilter::Any);
        assert!(matches!(
            "date".parse::<TypeFilter>(),
            Err(ContaminationError::UnknownTypeFilter(_))
        ));
    }

    #[test]
    fn test_type_filter_matches() {
        assert!(TypeFilter::Text.matches(ColumnKind::Categorical));
        assert!(TypeFilter::Text.matches(ColumnKind::Text));
        assert!(!TypeFilter::Text.matches(ColumnKind::Numeric));
        assert!(!TypeFilter::Numeric.matches(ColumnKind::Other));
        assert!(TypeFilter::Any.matches(ColumnKind::Other));
    }

    #[test]
    fn test_column_ref_resolution() {
        let df = df![
            "a" => [1, 2],
            "b" => ["x", "y"],
        ]
        .unwrap();

        assert_eq!(ColumnRef::Name("b".to_string()).resolve_index(&df).unwrap(), 1);
        assert_eq!(ColumnRef::Index(0).resolve_name(&df).unwrap(), "a");
        assert!(ColumnRef::Index(2).resolve_index(&df).is_err());
        assert!(ColumnRef::Name("c".to_string()).resolve_name(&df).is_err());
        assert_eq!(
            ColumnRef::from_index(&df, 1, RefForm::Name).unwrap(),
            ColumnRef::Name("b".to_string())
        );
    }

    #[test]
    fn test_table_from_columns() {
        let single = Table::from_columns(vec![Column::new("a".into(), [1, 2, 3])]).unwrap();
        assert!(matches!(single, Table::Column(_)));

        let frame = Table::from_columns(vec![
            Column::new("a".into(), [1, 2]),
            Column::new("b".into(), [3, 4]),
        ])
        .unwrap();
        assert!(matches!(frame, Table::Frame(_)));

        assert!(matches!(
            Table::from_columns(vec![]),
            Err(ContaminationError::InvalidInputKind(_))
        ));
        assert!(matches!(
            Table::from_columns(vec![
                Column::new("a".into(), [1, 2]),
                Column::new("b".into(), [3, 4, 5]),
            ]),
            Err(ContaminationError::InvalidInputKind(_))
        ));
    }

    #[test]
    fn test_action_between_tracks_changes() {
        let before = df![
            "a" => [1, 2],
            "b" => ["x", "y"],
        ]
        .unwrap();
        let after = df![
            "a" => ["1", "2"],
            "b" => [Some("x"), None],
        ]
        .unwrap();

        let action =
            ContaminationAction::between(OperatorKind::NumericToText, &before, &after, 1);
        assert_eq!(action.touched, 1);
        assert_eq!(action.retyped_columns, vec!["a".to_string()]);
        assert_eq!(action.nulls_added(), 1);
        assert_eq!(action.rows_added(), 0);
    }
}
