use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconError {
    /// Referenced column is absent from the table.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },
    /// Numeric filter on a column that is not uniformly numeric.
    #[error("column '{column}' is not numeric")]
    NotNumeric { column: String },
    /// Between-filter with `low > high`.
    #[error("invalid range: low {low} is greater than high {high}")]
    InvalidRange { low: f64, high: f64 },
    /// No input table contains the key column.
    #[error("no valid sources: none of the inputs contain the key column ({} skipped)", .skipped.len())]
    NoValidSources { skipped: Vec<String> },
    /// The input table set is empty.
    #[error("no tables found")]
    NoTablesFound,
    /// Column name repeated in a table header or projection list.
    #[error("duplicate column '{column}'")]
    DuplicateColumn { column: String },
    /// Row does not carry exactly one value per column.
    #[error("row {row}: expected {expected} values, found {found}")]
    RowWidth { row: usize, expected: usize, found: usize },
}

impl ReconError {
    pub(crate) fn unknown_column(column: &str) -> Self {
        Self::UnknownColumn { column: column.to_string() }
    }
}
