// Subcommand implementations: load, run one engine operation, save, report

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sheetsift_config::Settings;
use sheetsift_io::{self as io, LoadOptions, Operation, SaveOptions};
use sheetsift_recon::filter::{self, FilterCriterion};
use sheetsift_recon::merge::{append_and_dedupe, join_by_key};
use sheetsift_recon::project::{project_drop, project_keep};
use sheetsift_recon::reconcile::{dedupe_by_key, exclude_by_key};
use sheetsift_recon::{ColumnDescriptor, ReconError, RowCounts, Source, Table, Value};
use tracing::{debug, info};

use crate::exit_codes::EXIT_EMPTY_INTERSECTION;
use crate::report::{print_json, UnifyReport, WriteReport};
use crate::where_clause::{parse_where, resolve_chain, WhereClause};
use crate::CliError;

/// Resolved settings and global flags shared by every command.
pub struct Context {
    pub settings: Settings,
    pub output_dir: PathBuf,
    pub load: LoadOptions,
    pub save: SaveOptions,
    pub json: bool,
}

impl Context {
    pub fn new(settings: Settings, output_dir: Option<&Path>, sheet: Option<String>, json: bool) -> Result<Self, CliError> {
        let delimiter = settings.delimiter().map_err(CliError::settings)?;
        Ok(Self {
            output_dir: settings.effective_output_dir(output_dir),
            load: LoadOptions { sheet, delimiter },
            save: SaveOptions { delimiter },
            settings,
            json,
        })
    }

    fn key_or_default(&self, key: Option<String>) -> String {
        key.unwrap_or_else(|| self.settings.key_column.clone())
    }

    fn load(&self, path: &Path) -> Result<Table, CliError> {
        io::load(path, &self.load).map_err(CliError::io)
    }

    /// Write an operation's result next to its siblings in the output directory.
    fn write(&self, table: &Table, op: Operation, source: &Path) -> Result<PathBuf, CliError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            CliError::file(format!("cannot create {}: {}", self.output_dir.display(), e))
        })?;
        let target = io::output_path(&self.output_dir, op, source);
        io::save(table, &target, &self.save).map_err(CliError::io)
    }

    fn finish(
        &self,
        command: &str,
        inputs: Vec<&Path>,
        table: &Table,
        op: Operation,
        counts: RowCounts,
    ) -> Result<(), CliError> {
        let source = inputs.first().copied().unwrap_or(Path::new(""));
        let written = self.write(table, op, source)?;
        WriteReport::new(command, inputs, &written, counts).emit(self.json)
    }
}

fn parse_clauses(raw: &[String]) -> Result<Vec<WhereClause>, CliError> {
    raw.iter().map(|s| parse_where(s)).collect()
}

// ============================================================================
// columns / values
// ============================================================================

#[derive(Serialize)]
struct ColumnsReport<'a> {
    file: &'a Path,
    rows: usize,
    columns: Vec<&'a ColumnDescriptor>,
}

pub fn cmd_columns(ctx: &Context, file: PathBuf) -> Result<(), CliError> {
    let table = ctx.load(&file)?;
    let schema = table.schema();
    if ctx.json {
        return print_json(&ColumnsReport {
            file: &file,
            rows: table.row_count(),
            columns: schema.iter().collect(),
        });
    }
    for column in schema.iter() {
        println!("{}\t{}\t{}", column.name, column.kind, column.non_empty);
    }
    Ok(())
}

#[derive(Serialize)]
struct ValuesReport<'a> {
    column: &'a str,
    filters: Vec<ActiveFilter<'a>>,
    values: Vec<Value>,
}

#[derive(Serialize)]
struct ActiveFilter<'a> {
    column: &'a str,
    value: &'a Value,
}

pub fn cmd_values(ctx: &Context, file: PathBuf, column: String, where_args: Vec<String>) -> Result<(), CliError> {
    let table = ctx.load(&file)?;
    let chain = resolve_chain(&table, &parse_clauses(&where_args)?)?;
    let values = filter::unique_values(&table, &column, &chain)
        .map_err(|e| CliError::recon(e, Some(&table)))?;

    if values.is_empty() {
        return Err(CliError {
            code: EXIT_EMPTY_INTERSECTION,
            message: format!("no values for '{}' under the current filters", column),
            hint: Some("drop a --where clause to widen the selection".to_string()),
        });
    }

    if ctx.json {
        return print_json(&ValuesReport {
            column: &column,
            filters: chain.iter().map(|(column, value)| ActiveFilter { column, value }).collect(),
            values,
        });
    }
    for value in &values {
        println!("{}", value.display_string());
    }
    Ok(())
}

// ============================================================================
// Single-table transforms
// ============================================================================

pub fn cmd_filter(ctx: &Context, file: PathBuf, where_args: Vec<String>) -> Result<(), CliError> {
    let table = ctx.load(&file)?;
    let chain = resolve_chain(&table, &parse_clauses(&where_args)?)?;
    debug!(filters = chain.len(), "applying equality filters");
    let out = filter::filter_chain(&table, &chain).map_err(|e| CliError::recon(e, Some(&table)))?;
    ctx.finish("filter", vec![file.as_path()], &out, Operation::Filter, RowCounts::between(&table, &out))
}

pub fn cmd_keep(ctx: &Context, file: PathBuf, columns: Vec<String>) -> Result<(), CliError> {
    let table = ctx.load(&file)?;
    let out = project_keep(&table, &columns).map_err(|e| CliError::recon(e, Some(&table)))?;
    ctx.finish("keep", vec![file.as_path()], &out, Operation::KeepColumns, RowCounts::between(&table, &out))
}

pub fn cmd_drop(ctx: &Context, file: PathBuf, columns: Vec<String>) -> Result<(), CliError> {
    let table = ctx.load(&file)?;
    let out = project_drop(&table, &columns).map_err(|e| CliError::recon(e, Some(&table)))?;
    ctx.finish("drop", vec![file.as_path()], &out, Operation::DropColumns, RowCounts::between(&table, &out))
}

pub fn cmd_numeric(
    ctx: &Context,
    file: PathBuf,
    column: String,
    gt: Option<f64>,
    between: Option<Vec<f64>>,
) -> Result<(), CliError> {
    let criterion = match (gt, between.as_deref()) {
        (Some(threshold), None) => FilterCriterion::greater_than(column, threshold),
        (None, Some(&[low, high])) => FilterCriterion::between(column, low, high),
        _ => return Err(CliError::args("pass exactly one of --gt X or --between LOW HIGH")),
    };
    let table = ctx.load(&file)?;
    let out = filter::apply(&table, &criterion).map_err(|e| CliError::recon(e, Some(&table)))?;
    ctx.finish("numeric", vec![file.as_path()], &out, Operation::Numeric, RowCounts::between(&table, &out))
}

pub fn cmd_cellphones(ctx: &Context, file: PathBuf, column: String) -> Result<(), CliError> {
    let table = ctx.load(&file)?;
    let out = filter::filter_cellphones(&table, &column).map_err(|e| CliError::recon(e, Some(&table)))?;
    ctx.finish("cellphones", vec![file.as_path()], &out, Operation::Cellphones, RowCounts::between(&table, &out))
}

pub fn cmd_names(ctx: &Context, file: PathBuf, column: String, names: Vec<String>) -> Result<(), CliError> {
    let table = ctx.load(&file)?;
    let out = filter::filter_names(&table, &column, &names).map_err(|e| CliError::recon(e, Some(&table)))?;
    ctx.finish("names", vec![file.as_path()], &out, Operation::Names, RowCounts::between(&table, &out))
}

// ============================================================================
// Identifier reconciliation
// ============================================================================

pub fn cmd_dedupe(ctx: &Context, file: PathBuf, key: Option<String>) -> Result<(), CliError> {
    let key = ctx.key_or_default(key);
    let table = ctx.load(&file)?;
    let result = dedupe_by_key(&table, &key).map_err(|e| CliError::recon(e, Some(&table)))?;
    ctx.finish("dedupe", vec![file.as_path()], &result.table, Operation::Dedupe, result.counts)
}

pub fn cmd_exclude(
    ctx: &Context,
    base: PathBuf,
    removal: PathBuf,
    base_key: Option<String>,
    removal_key: Option<String>,
) -> Result<(), CliError> {
    let base_key = ctx.key_or_default(base_key);
    let removal_key = removal_key.unwrap_or_else(|| base_key.clone());
    let base_table = ctx.load(&base)?;
    let removal_table = ctx.load(&removal)?;

    // Resolve both keys up front so the hint names the right file's columns
    base_table.column_index(&base_key).map_err(|e| CliError::recon(e, Some(&base_table)))?;
    removal_table
        .column_index(&removal_key)
        .map_err(|e| CliError::recon(e, Some(&removal_table)))?;

    let result = exclude_by_key(&base_table, &removal_table, &base_key, &removal_key)
        .map_err(|e| CliError::recon(e, None))?;
    ctx.finish("exclude", vec![base.as_path(), removal.as_path()], &result.table, Operation::Exclude, result.counts)
}

pub fn cmd_join(
    ctx: &Context,
    left: PathBuf,
    right: PathBuf,
    left_key: Option<String>,
    right_key: Option<String>,
) -> Result<(), CliError> {
    let left_key = ctx.key_or_default(left_key);
    let right_key = right_key.unwrap_or_else(|| left_key.clone());
    let left_table = ctx.load(&left)?;
    let right_table = ctx.load(&right)?;

    left_table.column_index(&left_key).map_err(|e| CliError::recon(e, Some(&left_table)))?;
    right_table
        .column_index(&right_key)
        .map_err(|e| CliError::recon(e, Some(&right_table)))?;

    let out = join_by_key(&left_table, &right_table, &left_key, &right_key)
        .map_err(|e| CliError::recon(e, None))?;
    let counts = RowCounts::new(left_table.row_count(), out.row_count());
    ctx.finish("join", vec![left.as_path(), right.as_path()], &out, Operation::Join, counts)
}

pub fn cmd_unify(ctx: &Context, dir: PathBuf, key: Option<String>) -> Result<(), CliError> {
    let key = ctx.key_or_default(key);
    let scan = io::scan_dir(&dir, &ctx.settings.extensions).map_err(CliError::io)?;
    debug!(inspected = scan.inspected, candidates = scan.candidates.len(), "scan complete");

    let mut sources = Vec::with_capacity(scan.candidates.len());
    for path in &scan.candidates {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        sources.push(Source::new(name, ctx.load(path)?));
    }

    let unified = append_and_dedupe(&sources, &key).map_err(|e| {
        let hint = match &e {
            ReconError::NoValidSources { .. } => format!(
                "{} candidate file(s) in {}; none has a '{}' column",
                scan.candidates.len(),
                dir.display(),
                key
            ),
            _ => format!(
                "no files in {} with an accepted extension ({})",
                dir.display(),
                ctx.settings.extensions.join(", ")
            ),
        };
        CliError::recon(e, None).with_hint(hint)
    })?;
    for name in &unified.skipped {
        info!(source = %name, key = %key, "skipping source without key column");
    }

    let written = ctx.write(&unified.table, Operation::Unify, &dir)?;
    let mut report = WriteReport::new("unify", vec![dir.as_path()], &written, unified.counts);
    report.unify = Some(UnifyReport {
        candidates: scan.candidates.clone(),
        summary: unified.summary(),
    });
    report.emit(ctx.json)
}
