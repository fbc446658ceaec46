// Command summaries: human lines on stderr, one JSON value on stdout with --json

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sheetsift_recon::model::UnifySummary;
use sheetsift_recon::RowCounts;

use crate::CliError;

/// Summary of a command that wrote one output file.
#[derive(Debug, Serialize)]
pub struct WriteReport<'a> {
    pub command: &'a str,
    pub inputs: Vec<&'a Path>,
    pub output: &'a Path,
    pub rows_before: usize,
    pub rows_after: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unify: Option<UnifyReport>,
}

#[derive(Debug, Serialize)]
pub struct UnifyReport {
    pub candidates: Vec<PathBuf>,
    #[serde(flatten)]
    pub summary: UnifySummary,
}

impl<'a> WriteReport<'a> {
    pub fn new(command: &'a str, inputs: Vec<&'a Path>, output: &'a Path, counts: RowCounts) -> Self {
        Self {
            command,
            inputs,
            output,
            rows_before: counts.before,
            rows_after: counts.after,
            unify: None,
        }
    }

    pub fn emit(&self, json: bool) -> Result<(), CliError> {
        if json {
            return print_json(self);
        }
        if let Some(unify) = &self.unify {
            eprintln!(
                "found {} candidate file(s), {} usable",
                unify.candidates.len(),
                unify.summary.used.len()
            );
            for name in &unify.summary.skipped {
                eprintln!("skipped {name}: no key column");
            }
        }
        eprintln!(
            "wrote {} ({} → {} rows)",
            self.output.display(),
            self.rows_before,
            self.rows_after
        );
        Ok(())
    }
}

/// Print exactly one JSON value followed by a newline.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).map_err(|e| CliError::general(e.to_string()))?;
    writeln!(handle).map_err(|e| CliError::general(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_report_shape() {
        let report = WriteReport::new(
            "dedupe",
            vec![Path::new("in.xlsx")],
            Path::new("out/unique_cpf_in.xlsx"),
            RowCounts::new(5, 3),
        );
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["command"], "dedupe");
        assert_eq!(v["rows_before"], 5);
        assert_eq!(v["rows_after"], 3);
        assert_eq!(v["output"], "out/unique_cpf_in.xlsx");
        assert!(v.get("unify").is_none());
    }

    #[test]
    fn unify_details_flatten() {
        let mut report = WriteReport::new("unify", vec![Path::new("dir")], Path::new("u.xlsx"), RowCounts::new(4, 3));
        report.unify = Some(UnifyReport {
            candidates: vec![PathBuf::from("dir/a.xlsx")],
            summary: UnifySummary {
                sources: 1,
                used: vec!["a.xlsx".into()],
                skipped: vec![],
                rows_before: 4,
                rows_after: 3,
            },
        });
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["unify"]["used"][0], "a.xlsx");
        assert_eq!(v["unify"]["sources"], 1);
    }
}
