use std::path::PathBuf;

use sheetsift_recon::ReconError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: malformed CSV: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{}: cannot read spreadsheet: {message}", .path.display())]
    Spreadsheet { path: PathBuf, message: String },
    #[error("{}: workbook contains no sheets", .path.display())]
    NoSheets { path: PathBuf },
    #[error("{}: no sheet named '{sheet}' (available: {})", .path.display(), .available.join(", "))]
    UnknownSheet {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },
    #[error("{}: unsupported file format", .path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("cannot write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
    #[error("{}: {source}", .path.display())]
    Engine {
        path: PathBuf,
        #[source]
        source: ReconError,
    },
}

impl IoError {
    /// File the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. }
            | Self::Read { path, .. }
            | Self::Csv { path, .. }
            | Self::Spreadsheet { path, .. }
            | Self::NoSheets { path }
            | Self::UnknownSheet { path, .. }
            | Self::UnsupportedFormat { path }
            | Self::Write { path, .. }
            | Self::Engine { path, .. } => path,
        }
    }
}
