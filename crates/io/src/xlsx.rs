// Spreadsheet import (xlsx, xls, xlsm, xlsb, ods) and export (xlsx only)
//
// Import reads one sheet: its first row is the header, every later row a record.
// Export writes a single sheet with a bold header row.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate, Timelike};
use rust_xlsxwriter::{Format, Workbook};
use sheetsift_recon::{Table, Value};
use tracing::debug;

use crate::error::IoError;
use crate::header::clean_headers;

/// Excel cannot store more than 15 significant digits in a number
pub(crate) const EXCEL_MAX_SAFE_DIGITS: u32 = 15;

/// Load `sheet` (or the first sheet) of a workbook.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, IoError> {
    let spreadsheet_err = |message: String| IoError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| IoError::UnknownSheet {
                path: path.to_path_buf(),
                sheet: name.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IoError::NoSheets { path: path.to_path_buf() })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| spreadsheet_err(format!("sheet '{}': {}", sheet_name, e)))?;

    let mut rows_iter = range.rows();
    let columns = match rows_iter.next() {
        Some(header) => clean_headers(header.iter().map(|c| convert_cell(c).display_string())),
        None => Vec::new(),
    };

    let rows: Vec<Vec<Value>> = rows_iter
        .map(|r| r.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|r| r.iter().any(|v| !v.is_empty()))
        .collect();

    let table = Table::new(columns, rows).map_err(|source| IoError::Engine {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        sheet = %sheet_name,
        rows = table.row_count(),
        columns = table.column_count(),
        "read spreadsheet"
    );
    Ok(table)
}

fn convert_cell(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::String(s) if s.is_empty() => Value::Empty,
        Data::String(s) => Value::text(s.as_str()),
        Data::Float(n) => Value::Number(*n),
        Data::Int(n) => Value::Number(*n as f64),
        Data::Bool(b) => Value::text(if *b { "TRUE" } else { "FALSE" }),
        Data::Error(e) => Value::text(e.to_string()),
        Data::DateTime(dt) => Value::text(serial_to_iso(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::text(s.as_str()),
    }
}

/// Excel serial date (1900 system) to `YYYY-MM-DD`, or `YYYY-MM-DD HH:MM:SS`
/// when the serial carries a time of day.
fn serial_to_iso(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return serial.to_string();
    };
    let millis = (serial * 86_400_000.0).round() as i64;
    let Some(dt) = epoch.checked_add_signed(Duration::milliseconds(millis)) else {
        return serial.to_string();
    };
    if dt.num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Check if a number exceeds Excel's safe precision (15 significant digits)
fn exceeds_excel_precision(n: f64) -> bool {
    n.is_finite() && n.trunc().abs() >= 10f64.powi(EXCEL_MAX_SAFE_DIGITS as i32)
}

pub fn export(table: &Table, path: &Path, sheet_name: &str) -> Result<(), IoError> {
    let write_err = |e: rust_xlsxwriter::XlsxError| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(sheet_name).map_err(write_err)?;

    let header_format = Format::new().set_bold();
    let cell_format = Format::new();

    for (col, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header_format)
            .map_err(write_err)?;
    }

    let mut as_text = 0usize;
    for (r, row) in table.rows().iter().enumerate() {
        let row32 = (r + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let col16 = col as u16;
            match value {
                Value::Empty => {}
                Value::Text(s) => {
                    worksheet
                        .write_string_with_format(row32, col16, s, &cell_format)
                        .map_err(write_err)?;
                }
                Value::Number(n) if exceeds_excel_precision(*n) => {
                    // Export as text to preserve exact value
                    worksheet
                        .write_string_with_format(row32, col16, value.display_string(), &cell_format)
                        .map_err(write_err)?;
                    as_text += 1;
                }
                Value::Number(n) => {
                    worksheet
                        .write_number_with_format(row32, col16, *n, &cell_format)
                        .map_err(write_err)?;
                }
            }
        }
    }

    workbook.save(path).map_err(write_err)?;
    debug!(
        path = %path.display(),
        rows = table.row_count(),
        precision_as_text = as_text,
        "wrote xlsx"
    );
    Ok(())
}
