use serde::Serialize;

use crate::table::Table;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A named table handed to a multi-source operation (name = file name).
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub table: Table,
}

impl Source {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self { name: name.into(), table }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// Row counts before and after an operation. Advisory, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub before: usize,
    pub after: usize,
}

impl RowCounts {
    pub fn new(before: usize, after: usize) -> Self {
        Self { before, after }
    }

    pub fn between(input: &Table, output: &Table) -> Self {
        Self::new(input.row_count(), output.row_count())
    }

    pub fn removed(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

/// Output of exclusion and dedupe.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub table: Table,
    pub counts: RowCounts,
}

/// Output of multi-source append.
#[derive(Debug, Clone)]
pub struct Unified {
    pub table: Table,
    /// Sources that contributed rows, in input order.
    pub used: Vec<String>,
    /// Sources lacking the key column.
    pub skipped: Vec<String>,
    /// `before` = concatenated rows, `after` = rows left after dedupe.
    pub counts: RowCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnifySummary {
    pub sources: usize,
    pub used: Vec<String>,
    pub skipped: Vec<String>,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl Unified {
    pub fn summary(&self) -> UnifySummary {
        UnifySummary {
            sources: self.used.len() + self.skipped.len(),
            used: self.used.clone(),
            skipped: self.skipped.clone(),
            rows_before: self.counts.before,
            rows_after: self.counts.after,
        }
    }
}
