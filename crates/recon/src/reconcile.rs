//! Cross-table exclusion and dedupe by canonical identifier.
//!
//! Keys are compared in canonical (digits-only, zero-padded) form, so the
//! rewritten key column of the output never holds two equal keys.

use std::collections::HashSet;

use crate::error::ReconError;
use crate::identifier::{canonical_keys, format_column};
use crate::model::{Reconciled, RowCounts};
use crate::table::Table;

/// Keep `base` rows whose key is absent from `removal`'s key set.
pub fn exclude_by_key(
    base: &Table,
    removal: &Table,
    base_key_col: &str,
    removal_key_col: &str,
) -> Result<Reconciled, ReconError> {
    let base_idx = base.column_index(base_key_col)?;
    let base_keys = canonical_keys(base, base_key_col)?;
    let removal_keys: HashSet<String> = canonical_keys(removal, removal_key_col)?.into_iter().collect();

    let mut rows: Vec<_> = base
        .rows()
        .iter()
        .zip(&base_keys)
        .filter(|(_, key)| !removal_keys.contains(key.as_str()))
        .map(|(row, _)| row.clone())
        .collect();
    format_column(&mut rows, base_idx);

    let table = base.with_rows(rows);
    Ok(Reconciled { counts: RowCounts::between(base, &table), table })
}

/// Keep the first row (lowest index) per canonical key.
pub fn dedupe_by_key(table: &Table, key_col: &str) -> Result<Reconciled, ReconError> {
    let idx = table.column_index(key_col)?;
    let keys = canonical_keys(table, key_col)?;

    let mut seen: HashSet<&str> = HashSet::with_capacity(keys.len());
    let mut rows: Vec<_> = table
        .rows()
        .iter()
        .zip(&keys)
        .filter(|(_, key)| seen.insert(key.as_str()))
        .map(|(row, _)| row.clone())
        .collect();
    format_column(&mut rows, idx);

    let out = table.with_rows(rows);
    Ok(Reconciled { counts: RowCounts::between(table, &out), table: out })
}
