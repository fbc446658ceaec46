//! Key-based inner join of two tables, and append of many tables with one
//! global de-duplication pass.

use std::collections::{HashMap, HashSet};

use crate::error::ReconError;
use crate::identifier::normalized_keys;
use crate::model::{RowCounts, Source, Unified};
use crate::table::Table;
use crate::value::{Value, ValueKey};

const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

/// Inner join on normalized keys. Ties on either side produce every
/// combination, in left row order then right row order.
///
/// Output columns are all left columns followed by all right columns. A name
/// present on both sides (keys included) is suffixed `_x` on the left and
/// `_y` on the right. Both key columns hold the normalized digits.
pub fn join_by_key(
    left: &Table,
    right: &Table,
    left_key_col: &str,
    right_key_col: &str,
) -> Result<Table, ReconError> {
    let left_idx = left.column_index(left_key_col)?;
    let right_idx = right.column_index(right_key_col)?;
    let left_keys = normalized_keys(left, left_key_col)?;
    let right_keys = normalized_keys(right, right_key_col)?;

    let mut right_by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (j, key) in right_keys.iter().enumerate() {
        right_by_key.entry(key.as_str()).or_default().push(j);
    }

    let columns = joined_columns(left.columns(), right.columns());

    let mut rows = Vec::new();
    for (i, left_row) in left.rows().iter().enumerate() {
        let Some(matches) = right_by_key.get(left_keys[i].as_str()) else {
            continue;
        };
        for &j in matches {
            let mut row = Vec::with_capacity(columns.len());
            row.extend(left_row.iter().cloned());
            row[left_idx] = Value::Text(left_keys[i].clone());
            row.extend(right.rows()[j].iter().cloned());
            row[left_row.len() + right_idx] = Value::Text(right_keys[j].clone());
            rows.push(row);
        }
    }

    Ok(Table::from_parts(columns, rows))
}

fn joined_columns(left: &[String], right: &[String]) -> Vec<String> {
    let left_names: HashSet<&str> = left.iter().map(String::as_str).collect();
    let right_names: HashSet<&str> = right.iter().map(String::as_str).collect();

    let mut used: HashSet<String> = left
        .iter()
        .chain(right)
        .filter(|c| !(left_names.contains(c.as_str()) && right_names.contains(c.as_str())))
        .cloned()
        .collect();

    let mut columns: Vec<String> = left
        .iter()
        .map(|c| disambiguate(c, LEFT_SUFFIX, &right_names, &mut used))
        .collect();
    for c in right {
        columns.push(disambiguate(c, RIGHT_SUFFIX, &left_names, &mut used));
    }
    columns
}

fn disambiguate(name: &str, suffix: &str, other: &HashSet<&str>, used: &mut HashSet<String>) -> String {
    if !other.contains(name) {
        return name.to_string();
    }
    let mut candidate = format!("{name}{suffix}");
    while used.contains(&candidate) {
        candidate.push_str(suffix);
    }
    used.insert(candidate.clone());
    candidate
}

/// Concatenate sources that carry `key_col`, then keep the first row per raw
/// key value (no normalization).
///
/// The output header is the union of the used sources' columns in order of
/// first appearance; cells a source lacks are empty.
pub fn append_and_dedupe(sources: &[Source], key_col: &str) -> Result<Unified, ReconError> {
    if sources.is_empty() {
        return Err(ReconError::NoTablesFound);
    }

    let (valid, invalid): (Vec<&Source>, Vec<&Source>) =
        sources.iter().partition(|s| s.table.has_column(key_col));
    let skipped: Vec<String> = invalid.iter().map(|s| s.name.clone()).collect();
    if valid.is_empty() {
        return Err(ReconError::NoValidSources { skipped });
    }

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for source in &valid {
        for name in source.table.columns() {
            if !positions.contains_key(name) {
                positions.insert(name.clone(), columns.len());
                columns.push(name.clone());
            }
        }
    }

    let mut concatenated: Vec<Vec<Value>> = Vec::new();
    for source in &valid {
        let targets: Vec<usize> = source.table.columns().iter().map(|c| positions[c]).collect();
        for row in source.table.rows() {
            let mut out = vec![Value::Empty; columns.len()];
            for (value, &target) in row.iter().zip(&targets) {
                out[target] = value.clone();
            }
            concatenated.push(out);
        }
    }

    let key_idx = positions[key_col];
    let before = concatenated.len();
    let mut seen: HashSet<ValueKey> = HashSet::with_capacity(before);
    let rows: Vec<Vec<Value>> = concatenated
        .into_iter()
        .filter(|row| seen.insert(row[key_idx].key()))
        .collect();

    Ok(Unified {
        counts: RowCounts::new(before, rows.len()),
        table: Table::from_parts(columns, rows),
        used: valid.iter().map(|s| s.name.clone()).collect(),
        skipped,
    })
}
