//! Identifier canonicalization (CPF-style national ID numbers).
//!
//! `normalize` keeps the digits, `format` pads them to the persisted width.
//! Exclusion and dedupe treat two identifiers as the same record iff their
//! formatted forms are equal; join compares normalized digits.

use crate::error::ReconError;
use crate::table::Table;
use crate::value::Value;

/// Fixed width of the formatted identifier.
pub const CANONICAL_WIDTH: usize = 11;

/// Keep only ASCII digits of the value's display form.
pub fn normalize(raw: &Value) -> String {
    normalize_str(&raw.display_string())
}

pub fn normalize_str(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `normalize`, then left-pad with zeros to [`CANONICAL_WIDTH`].
/// Longer identifiers are kept whole.
pub fn format(raw: &Value) -> String {
    format_str(&raw.display_string())
}

pub fn format_str(raw: &str) -> String {
    let digits = normalize_str(raw);
    format!("{:0>width$}", digits, width = CANONICAL_WIDTH)
}

/// Normalized key of every row, in row order.
pub(crate) fn normalized_keys(table: &Table, column: &str) -> Result<Vec<String>, ReconError> {
    let idx = table.column_index(column)?;
    Ok(table.rows().iter().map(|row| normalize(&row[idx])).collect())
}

/// Formatted key of every row, in row order. `"999"` and `"00000000999"`
/// share a canonical key.
pub(crate) fn canonical_keys(table: &Table, column: &str) -> Result<Vec<String>, ReconError> {
    let idx = table.column_index(column)?;
    Ok(table.rows().iter().map(|row| format(&row[idx])).collect())
}

/// Rewrite one column of owned rows to the formatted identifier form.
pub(crate) fn format_column(rows: &mut [Vec<Value>], idx: usize) {
    for row in rows {
        row[idx] = Value::Text(format(&row[idx]));
    }
}
