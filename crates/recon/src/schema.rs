use serde::Serialize;

use crate::error::ReconError;
use crate::table::Table;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Every non-empty cell is a number, and at least one cell is non-empty.
    Numeric,
    /// Every non-empty cell is text.
    Text,
    /// Both numbers and text.
    Mixed,
    /// No non-empty cells.
    Empty,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Text => write!(f, "text"),
            Self::Mixed => write!(f, "mixed"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub index: usize,
    pub kind: ColumnKind,
    pub non_empty: usize,
}

impl ColumnDescriptor {
    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    /// Turn operator input into a value comparable with this column's cells.
    pub fn coerce(&self, raw: &str) -> Value {
        if raw.is_empty() {
            return Value::Empty;
        }
        if matches!(self.kind, ColumnKind::Numeric | ColumnKind::Mixed) {
            if let Ok(n) = raw.trim().parse::<f64>() {
                if n.is_finite() {
                    return Value::Number(n);
                }
            }
        }
        Value::Text(raw.to_string())
    }
}

/// Typed per-column summary of a table, computed in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    columns: Vec<ColumnDescriptor>,
}

impl Schema {
    pub fn inspect(table: &Table) -> Self {
        let columns = table
            .columns()
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let mut numbers = 0usize;
                let mut texts = 0usize;
                for row in table.rows() {
                    match &row[index] {
                        Value::Empty => {}
                        Value::Number(_) => numbers += 1,
                        Value::Text(_) => texts += 1,
                    }
                }
                let kind = match (numbers, texts) {
                    (0, 0) => ColumnKind::Empty,
                    (_, 0) => ColumnKind::Numeric,
                    (0, _) => ColumnKind::Text,
                    _ => ColumnKind::Mixed,
                };
                ColumnDescriptor {
                    name: name.clone(),
                    index,
                    kind,
                    non_empty: numbers + texts,
                }
            })
            .collect();
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&ColumnDescriptor, ReconError> {
        self.get(name).ok_or_else(|| ReconError::unknown_column(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["Age".into(), "Name".into(), "Code".into(), "Notes".into()],
            vec![
                vec![Value::from(10_i64), Value::text("Ana"), Value::from(1_i64), Value::Empty],
                vec![Value::Empty, Value::text("Bia"), Value::text("X2"), Value::Empty],
                vec![Value::from(40_i64), Value::Empty, Value::from(3_i64), Value::Empty],
            ],
        )
        .unwrap()
    }

    #[test]
    fn kinds() {
        let t = table();
        let schema = t.schema();
        assert_eq!(schema.column("Age").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(schema.column("Name").unwrap().kind, ColumnKind::Text);
        assert_eq!(schema.column("Code").unwrap().kind, ColumnKind::Mixed);
        assert_eq!(schema.column("Notes").unwrap().kind, ColumnKind::Empty);
        assert_eq!(schema.column("Age").unwrap().non_empty, 2);
    }

    #[test]
    fn all_missing_column_is_not_numeric() {
        let t = table();
        assert!(!t.schema().column("Notes").unwrap().is_numeric());
        let numeric: Vec<_> = t.schema().numeric_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(numeric, vec!["Age"]);
    }

    #[test]
    fn coerce_follows_column_kind() {
        let t = table();
        let schema = t.schema();
        assert_eq!(schema.column("Age").unwrap().coerce("25"), Value::Number(25.0));
        assert_eq!(schema.column("Name").unwrap().coerce("25"), Value::text("25"));
        assert_eq!(schema.column("Code").unwrap().coerce("X2"), Value::text("X2"));
        assert_eq!(schema.column("Code").unwrap().coerce("3"), Value::Number(3.0));
        assert_eq!(schema.column("Age").unwrap().coerce(""), Value::Empty);
        assert_eq!(schema.column("Age").unwrap().coerce("inf"), Value::text("inf"));
    }
}
