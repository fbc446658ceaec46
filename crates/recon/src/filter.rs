//! Row filters: equality, cascading equality chains, numeric ranges, and
//! column-domain queries under an active chain.
//!
//! Every filter validates its columns before scanning, keeps surviving rows
//! in their original relative order, and returns a new table.

use std::collections::HashSet;

use crate::error::ReconError;
use crate::identifier::normalize;
use crate::table::Table;
use crate::value::{Value, ValueKey};

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Equals(Value),
    GreaterThan(f64),
    /// Inclusive on both ends.
    Between(f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriterion {
    pub column: String,
    pub comparison: Comparison,
}

impl FilterCriterion {
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { column: column.into(), comparison: Comparison::Equals(value.into()) }
    }

    pub fn greater_than(column: impl Into<String>, threshold: f64) -> Self {
        Self { column: column.into(), comparison: Comparison::GreaterThan(threshold) }
    }

    pub fn between(column: impl Into<String>, low: f64, high: f64) -> Self {
        Self { column: column.into(), comparison: Comparison::Between(low, high) }
    }
}

/// Ordered equality constraints, one per column, applied with AND semantics.
///
/// Re-inserting a column replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    constraints: Vec<(String, Value)>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.constraints.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.constraints.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.constraints.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.constraints.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl<C: Into<String>, V: Into<Value>> FromIterator<(C, V)> for FilterChain {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut chain = FilterChain::new();
        for (column, value) in iter {
            chain.insert(column, value);
        }
        chain
    }
}

// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

pub fn filter_equals(table: &Table, column: &str, value: &Value) -> Result<Table, ReconError> {
    let idx = table.column_index(column)?;
    let key = value.key();
    Ok(retain(table, |row| row[idx].key() == key))
}

/// Equivalent to folding `filter_equals` over the chain, in one pass.
pub fn filter_chain(table: &Table, chain: &FilterChain) -> Result<Table, ReconError> {
    let conditions = resolve_chain(table, chain)?;
    if conditions.is_empty() {
        return Ok(table.clone());
    }
    Ok(retain(table, |row| matches_all(row, &conditions)))
}

/// Distinct values of `column` among rows surviving `chain`, in first-seen order.
///
/// An empty result means the chain's intersection is empty.
pub fn unique_values(
    table: &Table,
    column: &str,
    chain: &FilterChain,
) -> Result<Vec<Value>, ReconError> {
    let idx = table.column_index(column)?;
    let conditions = resolve_chain(table, chain)?;

    let mut seen: HashSet<ValueKey> = HashSet::new();
    let mut values = Vec::new();
    for row in table.rows() {
        if !matches_all(row, &conditions) {
            continue;
        }
        if seen.insert(row[idx].key()) {
            values.push(row[idx].clone());
        }
    }
    Ok(values)
}

fn resolve_chain(table: &Table, chain: &FilterChain) -> Result<Vec<(usize, ValueKey)>, ReconError> {
    chain
        .iter()
        .map(|(column, value)| Ok((table.column_index(column)?, value.key())))
        .collect()
}

fn matches_all(row: &[Value], conditions: &[(usize, ValueKey)]) -> bool {
    conditions.iter().all(|(idx, key)| row[*idx].key() == *key)
}

// ---------------------------------------------------------------------------
// Numeric
// ---------------------------------------------------------------------------

/// True iff every non-missing cell is a number and the column is not all-missing.
pub fn is_numeric(table: &Table, column: &str) -> Result<bool, ReconError> {
    Ok(table.schema().column(column)?.is_numeric())
}

fn require_numeric(table: &Table, column: &str) -> Result<usize, ReconError> {
    let descriptor = table.schema().column(column)?;
    if !descriptor.is_numeric() {
        return Err(ReconError::NotNumeric { column: column.to_string() });
    }
    Ok(descriptor.index)
}

pub fn filter_greater_than(table: &Table, column: &str, threshold: f64) -> Result<Table, ReconError> {
    let idx = require_numeric(table, column)?;
    Ok(retain(table, |row| {
        row[idx].as_number().is_some_and(|n| n > threshold)
    }))
}

pub fn filter_between(table: &Table, column: &str, low: f64, high: f64) -> Result<Table, ReconError> {
    if low.is_nan() || high.is_nan() || low > high {
        return Err(ReconError::InvalidRange { low, high });
    }
    let idx = require_numeric(table, column)?;
    Ok(retain(table, |row| {
        row[idx].as_number().is_some_and(|n| low <= n && n <= high)
    }))
}

pub fn apply(table: &Table, criterion: &FilterCriterion) -> Result<Table, ReconError> {
    match &criterion.comparison {
        Comparison::Equals(value) => filter_equals(table, &criterion.column, value),
        Comparison::GreaterThan(threshold) => {
            filter_greater_than(table, &criterion.column, *threshold)
        }
        Comparison::Between(low, high) => filter_between(table, &criterion.column, *low, *high),
    }
}

// ---------------------------------------------------------------------------
// Contact fields
// ---------------------------------------------------------------------------

/// Local 11-digit form (area code + 9-prefixed subscriber) of a Brazilian
/// mobile number, accepting an optional `55` country code or `0` trunk prefix.
pub fn cellphone_digits(raw: &Value) -> Option<String> {
    let digits = normalize(raw);
    let local = match digits.len() {
        13 if digits.starts_with("55") => &digits[2..],
        12 if digits.starts_with('0') => &digits[1..],
        11 => digits.as_str(),
        _ => return None,
    };
    let bytes = local.as_bytes();
    if bytes[0] == b'0' || bytes[1] == b'0' || bytes[2] != b'9' {
        return None;
    }
    Some(local.to_string())
}

/// Keep rows holding a valid mobile number; the column is rewritten to its
/// local 11-digit form.
pub fn filter_cellphones(table: &Table, column: &str) -> Result<Table, ReconError> {
    let idx = table.column_index(column)?;
    let rows = table
        .rows()
        .iter()
        .filter_map(|row| {
            let digits = cellphone_digits(&row[idx])?;
            let mut row = row.clone();
            row[idx] = Value::Text(digits);
            Some(row)
        })
        .collect();
    Ok(table.with_rows(rows))
}

/// Keep rows whose cell contains any fragment, case-insensitively.
pub fn filter_names<S: AsRef<str>>(
    table: &Table,
    column: &str,
    fragments: &[S],
) -> Result<Table, ReconError> {
    let idx = table.column_index(column)?;
    let needles: Vec<String> = fragments
        .iter()
        .map(|f| f.as_ref().trim().to_lowercase())
        .filter(|f| !f.is_empty())
        .collect();
    Ok(retain(table, |row| {
        let haystack = row[idx].display_string().trim().to_lowercase();
        needles.iter().any(|n| haystack.contains(n.as_str()))
    }))
}

fn retain(table: &Table, keep: impl Fn(&[Value]) -> bool) -> Table {
    let rows = table.rows().iter().filter(|r| keep(r)).cloned().collect();
    table.with_rows(rows)
}
