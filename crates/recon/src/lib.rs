//! `sheetsift-recon`: tabular reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns new tables plus
//! row-count summaries. No CLI, IO or logging dependencies.

pub mod error;
pub mod filter;
pub mod identifier;
pub mod merge;
pub mod model;
pub mod project;
pub mod reconcile;
pub mod schema;
pub mod table;
pub mod value;

pub use error::ReconError;
pub use filter::{FilterChain, FilterCriterion};
pub use model::{Reconciled, RowCounts, Source, Unified};
pub use schema::{ColumnDescriptor, ColumnKind, Schema};
pub use table::Table;
pub use value::Value;
