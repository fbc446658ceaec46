// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use sheetsift_recon::{Table, Value};
use tracing::debug;

use crate::error::IoError;
use crate::header::clean_headers;
use crate::xlsx::EXCEL_MAX_SAFE_DIGITS;

/// Load a delimited file. `delimiter` is sniffed when `None`.
pub fn import(path: &Path, delimiter: Option<u8>) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    debug!(path = %path.display(), delimiter = %(delimiter as char).escape_default(), "reading delimited file");
    import_from_string(&content, delimiter).map_err(|e| e.at(path))
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the header line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header, weighted by field count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Excel-exported CSVs are often Windows-1252)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|source| IoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(strip_bom(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            debug!(path = %path.display(), "not UTF-8, decoded as Windows-1252");
            Ok(decoded.into_owned())
        }
    }
}

fn strip_bom(s: String) -> String {
    match s.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => s,
    }
}

/// Loader failure before the path is known.
#[derive(Debug)]
pub(crate) enum ParseError {
    Csv(csv::Error),
    Engine(sheetsift_recon::ReconError),
}

impl ParseError {
    pub(crate) fn at(self, path: &Path) -> IoError {
        let path = path.to_path_buf();
        match self {
            Self::Csv(source) => IoError::Csv { path, source },
            Self::Engine(source) => IoError::Engine { path, source },
        }
    }
}

pub(crate) fn import_from_string(content: &str, delimiter: u8) -> Result<Table, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let Some(header) = records.next().transpose().map_err(ParseError::Csv)? else {
        return Table::empty(Vec::new()).map_err(ParseError::Engine);
    };
    let columns = clean_headers(header.iter());
    let width = columns.len();

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(ParseError::Csv)?;
        // Blank lines carry no data
        if record.iter().all(str::is_empty) {
            continue;
        }
        let mut row: Vec<Value> = record.iter().map(type_field).collect();
        // Short rows are padded; long rows fail Table::new with RowWidth
        if row.len() < width {
            row.resize(width, Value::Empty);
        }
        rows.push(row);
    }

    let table = Table::new(columns, rows).map_err(ParseError::Engine)?;
    debug!(rows = table.row_count(), columns = table.column_count(), "parsed delimited content");
    Ok(table)
}

/// Plain decimal numerals become numbers; anything else, including numerals
/// with a redundant leading zero such as `00011122233` or more significant
/// digits than an f64 holds exactly, stays text.
pub fn type_field(field: &str) -> Value {
    if field.is_empty() {
        return Value::Empty;
    }
    if is_plain_numeral(field) && significant_digits(field) <= EXCEL_MAX_SAFE_DIGITS as usize {
        if let Ok(n) = field.parse::<f64>() {
            if n.is_finite() {
                return Value::Number(n);
            }
        }
    }
    Value::text(field)
}

fn is_plain_numeral(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if int.len() > 1 && int.starts_with('0') {
        return false;
    }
    match frac {
        Some(f) => !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

fn significant_digits(numeral: &str) -> usize {
    numeral
        .bytes()
        .filter(u8::is_ascii_digit)
        .skip_while(|&b| b == b'0')
        .count()
}

pub fn export(table: &Table, path: &Path, delimiter: u8) -> Result<(), IoError> {
    let write_err = |e: csv::Error| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(write_err)?;

    writer.write_record(table.columns()).map_err(write_err)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(Value::display_string))
            .map_err(write_err)?;
    }

    writer.flush().map_err(|e| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), rows = table.row_count(), "wrote delimited file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\nBob,25,London\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_field_typing() {
        assert_eq!(type_field(""), Value::Empty);
        assert_eq!(type_field("30"), Value::Number(30.0));
        assert_eq!(type_field("-2.5"), Value::Number(-2.5));
        assert_eq!(type_field("0"), Value::Number(0.0));
        assert_eq!(type_field("0.75"), Value::Number(0.75));
        assert_eq!(type_field("00011122233"), Value::text("00011122233"));
        assert_eq!(type_field("123.456.789-01"), Value::text("123.456.789-01"));
        assert_eq!(type_field("1e5"), Value::text("1e5"));
        assert_eq!(type_field(" 12"), Value::text(" 12"));
        assert_eq!(type_field("12."), Value::text("12."));
    }

    #[test]
    fn test_long_numerals_stay_text() {
        assert_eq!(type_field("999999999999999"), Value::Number(999_999_999_999_999.0));
        assert_eq!(type_field("0.000123456789012345"), Value::Number(0.000123456789012345));
        assert_eq!(type_field("1234567890123456"), Value::text("1234567890123456"));
        assert_eq!(type_field("1234567890123456789"), Value::text("1234567890123456789"));
        assert_eq!(type_field("-1234567890.123456"), Value::text("-1234567890.123456"));

        let table = import_from_string("Id\n1234567890123456789\n1234567890123456788\n", b',').unwrap();
        assert_ne!(table.rows()[0][0], table.rows()[1][0]);
    }

    #[test]
    fn test_semicolon_csv_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.csv");
        fs::write(&path, "Name;Age;City\nAlice;30;Paris\nBob;25;London\n").unwrap();

        let table = import(&path, None).unwrap();
        assert_eq!(table.columns(), ["Name", "Age", "City"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][1], Value::Number(30.0));
        assert_eq!(table.rows()[1][2], Value::text("London"));
    }

    #[test]
    fn test_short_rows_padded_long_rows_rejected() {
        let table = import_from_string("A,B,C\n1\n\n2,3,4\n", b',').unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0], vec![Value::Number(1.0), Value::Empty, Value::Empty]);

        let err = import_from_string("A,B\n1,2,3\n", b',').unwrap_err();
        assert!(matches!(
            err,
            ParseError::Engine(sheetsift_recon::ReconError::RowWidth { row: 0, expected: 2, found: 3 })
        ));
    }

    #[test]
    fn test_empty_file_is_empty_table() {
        let table = import_from_string("", b',').unwrap();
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Nome;Cidade\nJoão;São Paulo" in Windows-1252
        let mut bytes = b"Nome;Cidade\nJo".to_vec();
        bytes.push(0xE3);
        bytes.extend_from_slice(b"o;S");
        bytes.push(0xE3);
        bytes.extend_from_slice(b"o Paulo\n");
        fs::write(&path, bytes).unwrap();

        let table = import(&path, None).unwrap();
        assert_eq!(table.rows()[0][0], Value::text("João"));
        assert_eq!(table.rows()[0][1], Value::text("São Paulo"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{feff}CPF,Name\n1,Ana\n").unwrap();
        assert_eq!(import(&path, None).unwrap().columns(), ["CPF", "Name"]);
    }

    #[test]
    fn test_tsv_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.tsv");
        let table = Table::new(
            vec!["CPF".into(), "Value".into()],
            vec![
                vec![Value::text("00011122233"), Value::Number(42.0)],
                vec![Value::text("Bob"), Value::Empty],
            ],
        )
        .unwrap();

        export(&table, &path, b'\t').unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "CPF\tValue\n00011122233\t42\nBob\t\n");

        let imported = import(&path, Some(b'\t')).unwrap();
        assert_eq!(imported, table);
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = tempdir().unwrap();
        let err = import(&dir.path().join("nope.csv"), None).unwrap_err();
        assert!(matches!(err, IoError::Open { .. }));
    }
}
