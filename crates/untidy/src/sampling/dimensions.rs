//! Shape of a table or a single column.

use crate::types::TableInput;

/// Returns `(row_count, column_count)`.
///
/// A single column counts as a one-column table.
pub fn dimensions(input: TableInput<'_>) -> (usize, usize) {
    match input {
        TableInput::Frame(df) => (df.height(), df.width()),
        TableInput::Column(series) => (series.len(), 1),
    }
}
