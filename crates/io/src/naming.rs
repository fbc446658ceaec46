// Output file naming

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Engine operation whose result is being persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Filter,
    KeepColumns,
    DropColumns,
    Numeric,
    Exclude,
    Dedupe,
    Cellphones,
    Names,
    Join,
    Unify,
}

impl Operation {
    /// Prefix for operations named after their source file.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Self::Filter => Some("filtered_"),
            Self::KeepColumns => Some("kept_columns_"),
            Self::DropColumns => Some("removed_columns_"),
            Self::Numeric => Some("numeric_filtered_"),
            Self::Exclude => Some("cpf_filtered_"),
            Self::Dedupe => Some("unique_cpf_"),
            Self::Cellphones => Some("cellphone_filtered_"),
            Self::Names => Some("names_filtered_"),
            Self::Join | Self::Unify => None,
        }
    }

    /// Fixed file name for multi-source operations.
    pub fn fixed_name(self) -> Option<&'static str> {
        match self {
            Self::Join => Some("unified_by_cpf.xlsx"),
            Self::Unify => Some("unified_excel.xlsx"),
            _ => None,
        }
    }
}

/// `dir/<prefix><source file name>`, or `dir/<fixed name>`.
pub fn output_path(dir: &Path, op: Operation, source: &Path) -> PathBuf {
    if let Some(name) = op.fixed_name() {
        return dir.join(name);
    }
    let base = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.xlsx".to_string());
    dir.join(format!("{}{}", op.prefix().unwrap_or_default(), base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_names_keep_source_base() {
        let out = output_path(Path::new("out"), Operation::Exclude, Path::new("/data/base.xlsx"));
        assert_eq!(out, Path::new("out/cpf_filtered_base.xlsx"));

        let out = output_path(Path::new("."), Operation::Names, Path::new("people.csv"));
        assert_eq!(out, Path::new("./names_filtered_people.csv"));
    }

    #[test]
    fn multi_source_names_are_fixed() {
        let out = output_path(Path::new("out"), Operation::Unify, Path::new("ignored"));
        assert_eq!(out, Path::new("out/unified_excel.xlsx"));
        let out = output_path(Path::new("out"), Operation::Join, Path::new("left.xlsx"));
        assert_eq!(out, Path::new("out/unified_by_cpf.xlsx"));
    }

    #[test]
    fn every_operation_has_exactly_one_naming_rule() {
        use Operation::*;
        for op in [Filter, KeepColumns, DropColumns, Numeric, Exclude, Dedupe, Cellphones, Names, Join, Unify] {
            assert!(op.prefix().is_some() ^ op.fixed_name().is_some(), "{op:?}");
        }
    }
}
