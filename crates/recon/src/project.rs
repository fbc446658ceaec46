use std::collections::HashSet;

use crate::error::ReconError;
use crate::table::Table;

/// Keep exactly `columns`, in the order given.
pub fn project_keep<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Table, ReconError> {
    let mut seen = HashSet::with_capacity(columns.len());
    let mut indices = Vec::with_capacity(columns.len());
    for name in columns {
        let name = name.as_ref();
        let idx = table.column_index(name)?;
        if !seen.insert(idx) {
            return Err(ReconError::DuplicateColumn { column: name.to_string() });
        }
        indices.push(idx);
    }
    Ok(select(table, &indices))
}

/// Drop `columns`, keeping the remaining ones in their original order.
pub fn project_drop<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Table, ReconError> {
    let mut dropped = HashSet::with_capacity(columns.len());
    for name in columns {
        dropped.insert(table.column_index(name.as_ref())?);
    }
    let indices: Vec<usize> = (0..table.column_count()).filter(|i| !dropped.contains(i)).collect();
    Ok(select(table, &indices))
}

fn select(table: &Table, indices: &[usize]) -> Table {
    let columns = indices.iter().map(|&i| table.columns()[i].clone()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Table::from_parts(columns, rows)
}
