use std::fs;
use std::path::Path;

use sheetsift_io::{load, output_path, save, scan_dir, FileKind, IoError, LoadOptions, Operation, SaveOptions};
use sheetsift_recon::{Table, Value};

fn registry() -> Table {
    Table::new(
        vec!["CPF".into(), "Name".into(), "Age".into()],
        vec![
            vec![Value::text("123.456.789-01"), Value::text("Ana"), Value::Number(31.0)],
            vec![Value::text("00011122233"), Value::text("Bia"), Value::Empty],
        ],
    )
    .unwrap()
}

#[test]
fn csv_and_xlsx_preserve_the_same_table() {
    let dir = tempfile::tempdir().unwrap();
    let table = registry();

    let csv_path = save(&table, &dir.path().join("r.csv"), &SaveOptions::default()).unwrap();
    let xlsx_path = save(&table, &dir.path().join("r.xlsx"), &SaveOptions::default()).unwrap();

    let from_csv = load(&csv_path, &LoadOptions::default()).unwrap();
    let from_xlsx = load(&xlsx_path, &LoadOptions::default()).unwrap();
    assert_eq!(from_csv, table);
    assert_eq!(from_xlsx, table);
}

#[test]
fn legacy_spreadsheet_targets_are_written_as_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let written = save(&registry(), &dir.path().join("old.xls"), &SaveOptions::default()).unwrap();
    assert_eq!(written.extension().unwrap(), "xlsx");
    assert!(written.exists());
}

#[test]
fn configured_delimiter_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("semi.csv");
    let options = SaveOptions { delimiter: Some(b';') };
    save(&registry(), &path, &options).unwrap();
    assert!(fs::read_to_string(&path).unwrap().starts_with("CPF;Name;Age\n"));

    let options = LoadOptions { delimiter: Some(b';'), ..LoadOptions::default() };
    assert_eq!(load(&path, &options).unwrap(), registry());
}

#[test]
fn duplicate_headers_are_renamed_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dupes.csv");
    fs::write(&path, "CPF,Name,Name,\n1,Ana,Souza,x\n").unwrap();
    let table = load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(table.columns(), ["CPF", "Name", "Name.1", "Unnamed: 3"]);
}

#[test]
fn unsupported_extension() {
    let err = load(Path::new("report.pdf"), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFormat { .. }));
    assert_eq!(err.path(), Path::new("report.pdf"));
    assert!(FileKind::from_path(Path::new("FILE.XLSX")).is_ok());
}

#[test]
fn scan_then_name_unified_output() {
    let dir = tempfile::tempdir().unwrap();
    save(&registry(), &dir.path().join("jan.xlsx"), &SaveOptions::default()).unwrap();
    save(&registry(), &dir.path().join("feb.xlsx"), &SaveOptions::default()).unwrap();
    fs::write(dir.path().join("readme.md"), "x").unwrap();

    let report = scan_dir(dir.path(), &["xlsx", "xls"]).unwrap();
    assert_eq!(report.inspected, 3);
    assert_eq!(report.candidates.len(), 2);
    assert!(report.candidates[0].ends_with("feb.xlsx"));

    let out = output_path(dir.path(), Operation::Unify, &report.candidates[0]);
    assert!(out.ends_with("unified_excel.xlsx"));
}

#[test]
fn long_numeric_identifiers_survive_csv() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.csv");
    let removal = dir.path().join("removal.csv");
    fs::write(&base, "Id,Tag\n1234567890123456789,keep\n").unwrap();
    fs::write(&removal, "Id\n1234567890123456788\n").unwrap();

    let base_table = load(&base, &LoadOptions::default()).unwrap();
    let removal_table = load(&removal, &LoadOptions::default()).unwrap();
    assert_eq!(base_table.rows()[0][0], Value::text("1234567890123456789"));

    let result = sheetsift_recon::reconcile::exclude_by_key(&base_table, &removal_table, "Id", "Id").unwrap();
    assert_eq!(result.table.row_count(), 1);

    let written = save(&base_table, &dir.path().join("out.csv"), &SaveOptions::default()).unwrap();
    assert_eq!(fs::read_to_string(written).unwrap(), "Id,Tag\n1234567890123456789,keep\n");
}
