// Directory scan for multi-source unify

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::IoError;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Directory entries looked at, matching or not.
    pub inspected: usize,
    /// Accepted files, sorted by file name.
    pub candidates: Vec<PathBuf>,
}

/// Regular files in `dir` whose extension is in `extensions`
/// (case-insensitive, without the dot). Subdirectories are not descended.
pub fn scan_dir<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> Result<ScanReport, IoError> {
    let read_err = |source: std::io::Error| IoError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut report = ScanReport::default();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        report.inspected += 1;
        let path = entry.path();

        if !entry.file_type().map_err(read_err)?.is_file() {
            debug!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        if !has_extension(&path, extensions) {
            debug!(path = %path.display(), "skipping entry with unaccepted extension");
            continue;
        }
        report.candidates.push(path);
    }

    report.candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(
        dir = %dir.display(),
        inspected = report.inspected,
        candidates = report.candidates.len(),
        "scanned directory"
    );
    Ok(report)
}

fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|accepted| accepted.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.xlsx", "a.XLS", "notes.txt", "c.csv", "noext"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.xlsx")).unwrap();

        let report = scan_dir(dir.path(), &["xlsx", "xls"]).unwrap();
        assert_eq!(report.inspected, 6);
        let names: Vec<_> = report
            .candidates
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.XLS", "b.xlsx"]);
    }

    #[test]
    fn dotted_extensions_accepted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), b"").unwrap();
        let report = scan_dir(dir.path(), &[".csv".to_string()]).unwrap();
        assert_eq!(report.candidates.len(), 1);
    }

    #[test]
    fn missing_dir_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_dir(&dir.path().join("missing"), &["xlsx"]).unwrap_err();
        assert!(matches!(err, IoError::Read { .. }));
    }
}
