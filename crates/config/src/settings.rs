// Operator settings
// Loaded from ~/.config/sheetsift/settings.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid csv_delimiter {value:?}: expected a single ASCII character or \"tab\"")]
    Delimiter { value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key column for dedupe, exclude, join and unify
    pub key_column: String,

    /// Where outputs are written; the working directory when unset
    pub output_dir: Option<PathBuf>,

    /// Spreadsheet extensions accepted by unify
    pub extensions: Vec<String>,

    /// CSV delimiter; sniffed when unset
    pub csv_delimiter: Option<String>,

    /// Default log filter (EnvFilter syntax)
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_column: "CPF".to_string(),
            output_dir: None,
            extensions: vec!["xlsx".to_string(), "xls".to_string()],
            csv_delimiter: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Get the default settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetsift");
        config_dir.join("settings.toml")
    }

    /// Load settings.
    ///
    /// An explicit path must exist and parse. Without one, the default path is
    /// tried and any problem with it falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Ok(Self::load_default(&Self::config_path())),
        }
    }

    /// Strict load of one file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.delimiter()?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    fn load_default(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Output directory, with a command-line override taking precedence
    pub fn effective_output_dir(&self, overridden: Option<&Path>) -> PathBuf {
        overridden
            .map(Path::to_path_buf)
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Configured CSV delimiter as a byte
    pub fn delimiter(&self) -> Result<Option<u8>, ConfigError> {
        let Some(raw) = self.csv_delimiter.as_deref() else {
            return Ok(None);
        };
        if raw.eq_ignore_ascii_case("tab") {
            return Ok(Some(b'\t'));
        }
        match raw.as_bytes() {
            [b] if b.is_ascii() => Ok(Some(*b)),
            _ => Err(ConfigError::Delimiter { value: raw.to_string() }),
        }
    }
}
