use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::ReconError;
use crate::schema::Schema;
use crate::value::Value;

/// In-memory dataset: ordered, unique column names and ordered rows holding
/// exactly one [`Value`] per column.
///
/// Tables are immutable once built. Every engine operation returns a new
/// Table; the schema is inspected lazily and cached for the table's lifetime.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    schema: OnceLock<Schema>,
}

impl Table {
    /// Build a table, checking column uniqueness and row width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, ReconError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ReconError::DuplicateColumn { column: name.clone() });
            }
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != columns.len() {
                return Err(ReconError::RowWidth {
                    row,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
        }
        Ok(Self::from_parts(columns, rows))
    }

    /// Table with a header and no rows.
    pub fn empty(columns: Vec<String>) -> Result<Self, ReconError> {
        Self::new(columns, Vec::new())
    }

    /// Caller guarantees the invariants `new` checks.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            columns,
            rows,
            schema: OnceLock::new(),
        }
    }

    /// Same header, different rows.
    pub(crate) fn with_rows(&self, rows: Vec<Vec<Value>>) -> Self {
        Self::from_parts(self.columns.clone(), rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Position of `name` in the header, or `UnknownColumn`.
    pub fn column_index(&self, name: &str) -> Result<usize, ReconError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ReconError::unknown_column(name))
    }

    /// Cell at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Result<Option<&Value>, ReconError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.get(row).map(|r| &r[idx]))
    }

    /// All cells of the named column, top to bottom.
    pub fn column_values(&self, column: &str) -> Result<Vec<&Value>, ReconError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    pub fn schema(&self) -> &Schema {
        self.schema.get_or_init(|| Schema::inspect(self))
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.rows == other.rows
    }
}

impl Eq for Table {}
