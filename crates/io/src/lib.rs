// File I/O operations

pub mod csv;
pub mod error;
pub mod header;
pub mod naming;
pub mod scan;
pub mod xlsx;

use std::path::{Path, PathBuf};

use sheetsift_recon::Table;

pub use error::IoError;
pub use naming::{output_path, Operation};
pub use scan::{scan_dir, ScanReport};

/// Sheet name used when writing xlsx
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// File family, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `.csv`, `.txt` (sniffed) and `.tsv` (tab)
    Delimited,
    /// `.xlsx`, `.xlsm`, `.xls`, `.xlsb`, `.ods`
    Spreadsheet,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(Self::Delimited),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(IoError::UnsupportedFormat { path: path.to_path_buf() }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Spreadsheet sheet to read; the first sheet when `None`.
    pub sheet: Option<String>,
    /// CSV delimiter; sniffed when `None`.
    pub delimiter: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// CSV delimiter; `,` when `None` (tab for `.tsv`).
    pub delimiter: Option<u8>,
}

/// Parse a file into a Table.
pub fn load(path: &Path, options: &LoadOptions) -> Result<Table, IoError> {
    match FileKind::from_path(path)? {
        FileKind::Delimited => {
            let delimiter = if is_tsv(path) { Some(b'\t') } else { options.delimiter };
            csv::import(path, delimiter)
        }
        FileKind::Spreadsheet => xlsx::import(path, options.sheet.as_deref()),
    }
}

/// Write a Table, returning the path actually written.
///
/// Spreadsheet targets other than `.xlsx` are written as xlsx with the
/// extension replaced.
pub fn save(table: &Table, path: &Path, options: &SaveOptions) -> Result<PathBuf, IoError> {
    match FileKind::from_path(path)? {
        FileKind::Delimited => {
            let delimiter = if is_tsv(path) { b'\t' } else { options.delimiter.unwrap_or(b',') };
            csv::export(table, path, delimiter)?;
            Ok(path.to_path_buf())
        }
        FileKind::Spreadsheet => {
            let target = path.with_extension("xlsx");
            xlsx::export(table, &target, DEFAULT_SHEET_NAME)?;
            Ok(target)
        }
    }
}

fn is_tsv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tsv"))
}
