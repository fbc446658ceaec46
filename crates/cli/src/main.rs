// SheetSift CLI - filter, project, dedupe and reconcile spreadsheet tables

mod commands;
mod exit_codes;
mod report;
mod where_clause;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use sheetsift_config::{ConfigError, Settings};
use sheetsift_io::IoError;
use sheetsift_recon::{ReconError, Table};
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use commands::Context;
use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_FILE, EXIT_SETTINGS, EXIT_SUCCESS, EXIT_USAGE};

/// Env var holding an EnvFilter directive; wins over -v and settings
const LOG_ENV: &str = "SHEETSIFT_LOG";

#[derive(Parser)]
#[command(name = "sheetsift")]
#[command(about = "Reconcile spreadsheet tables: filter, project, dedupe, exclude, join")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/sheetsift/settings.toml)
    #[arg(long, global = true, env = "SHEETSIFT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Directory for output files (default: settings output_dir, else .)
    #[arg(short = 'o', long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Sheet to read from spreadsheet inputs (default: first sheet)
    #[arg(long, global = true)]
    sheet: Option<String>,

    /// Print a machine-readable summary on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List columns with their detected kind and non-empty count
    Columns {
        file: PathBuf,
    },

    /// Distinct values of a column among rows matching the filters
    #[command(after_help = "\
Examples:
  sheetsift values people.xlsx --column City
  sheetsift values people.xlsx --column Age --where City=Paris
  sheetsift values people.xlsx --column Name --where City=Paris --where Age=25")]
    Values {
        file: PathBuf,

        /// Column whose values to list
        #[arg(long)]
        column: String,

        /// Equality filter 'Column=value'. Repeatable.
        #[arg(long = "where", value_name = "COL=VAL")]
        where_clauses: Vec<String>,
    },

    /// Keep rows matching every equality filter
    Filter {
        file: PathBuf,

        /// Equality filter 'Column=value'. Repeatable.
        #[arg(long = "where", value_name = "COL=VAL", required = true)]
        where_clauses: Vec<String>,
    },

    /// Keep only the listed columns, in the listed order
    Keep {
        file: PathBuf,

        /// Comma-separated column names. Repeatable.
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },

    /// Remove the listed columns
    Drop {
        file: PathBuf,

        /// Comma-separated column names. Repeatable.
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },

    /// Keep rows whose numeric column is above a threshold or inside a range
    Numeric {
        file: PathBuf,

        #[arg(long)]
        column: String,

        /// Strictly greater than
        #[arg(long, allow_negative_numbers = true, required_unless_present = "between", conflicts_with = "between")]
        gt: Option<f64>,

        /// Inclusive range
        #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"], allow_negative_numbers = true)]
        between: Option<Vec<f64>>,
    },

    /// Remove base rows whose identifier appears in the removal file
    Exclude {
        base: PathBuf,
        removal: PathBuf,

        /// Key column in BASE (default: settings key_column)
        #[arg(long)]
        base_key: Option<String>,

        /// Key column in REMOVAL (default: the base key)
        #[arg(long)]
        removal_key: Option<String>,
    },

    /// Keep the first row per identifier
    Dedupe {
        file: PathBuf,

        /// Key column (default: settings key_column)
        #[arg(long)]
        key: Option<String>,
    },

    /// Inner join of two files on their identifier columns
    Join {
        left: PathBuf,
        right: PathBuf,

        #[arg(long)]
        left_key: Option<String>,

        /// Key column in RIGHT (default: the left key)
        #[arg(long)]
        right_key: Option<String>,
    },

    /// Append every spreadsheet in a directory, keeping the first row per key
    Unify {
        dir: PathBuf,

        /// Key column (default: settings key_column)
        #[arg(long)]
        key: Option<String>,
    },

    /// Keep rows holding a valid mobile number, normalized to 11 digits
    Cellphones {
        file: PathBuf,

        #[arg(long)]
        column: String,
    },

    /// Keep rows whose column contains any of the given names (case-insensitive)
    Names {
        file: PathBuf,

        #[arg(long)]
        column: String,

        /// Name fragment. Repeatable.
        #[arg(long = "name", value_name = "NAME", required = true)]
        names: Vec<String>,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  sheetsift-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  sheetsift-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = init_logging(cli.verbose).and_then(|reloader| run(cli, reloader));

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli, reloader: Option<LogReloader>) -> Result<(), CliError> {
    let settings = Settings::load(cli.config.as_deref()).map_err(CliError::settings)?;
    if let Some(reloader) = reloader {
        reloader.apply(&settings.log_level);
    }
    let ctx = Context::new(settings, cli.output_dir.as_deref(), cli.sheet, cli.json)?;

    match cli.command {
        Commands::Columns { file } => commands::cmd_columns(&ctx, file),
        Commands::Values { file, column, where_clauses } => {
            commands::cmd_values(&ctx, file, column, where_clauses)
        }
        Commands::Filter { file, where_clauses } => commands::cmd_filter(&ctx, file, where_clauses),
        Commands::Keep { file, columns } => commands::cmd_keep(&ctx, file, columns),
        Commands::Drop { file, columns } => commands::cmd_drop(&ctx, file, columns),
        Commands::Numeric { file, column, gt, between } => {
            commands::cmd_numeric(&ctx, file, column, gt, between)
        }
        Commands::Exclude { base, removal, base_key, removal_key } => {
            commands::cmd_exclude(&ctx, base, removal, base_key, removal_key)
        }
        Commands::Dedupe { file, key } => commands::cmd_dedupe(&ctx, file, key),
        Commands::Join { left, right, left_key, right_key } => {
            commands::cmd_join(&ctx, left, right, left_key, right_key)
        }
        Commands::Unify { dir, key } => commands::cmd_unify(&ctx, dir, key),
        Commands::Cellphones { file, column } => commands::cmd_cellphones(&ctx, file, column),
        Commands::Names { file, column, names } => commands::cmd_names(&ctx, file, column, names),
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Swaps in the settings' log level once settings are loaded. Only handed out
/// when neither the env var nor -v chose the filter.
struct LogReloader(reload::Handle<EnvFilter, Registry>);

impl LogReloader {
    fn apply(self, level: &str) {
        match EnvFilter::try_new(level) {
            Ok(filter) => {
                if let Err(e) = self.0.reload(filter) {
                    warn!("cannot apply log_level {:?}: {}", level, e);
                }
            }
            Err(e) => warn!("invalid log_level {:?} in settings: {}", level, e),
        }
    }
}

fn init_logging(verbose: u8) -> Result<Option<LogReloader>, CliError> {
    let (initial, from_settings) = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => (filter, false),
        Err(_) => match verbose {
            0 => (EnvFilter::new("warn"), true),
            1 => (EnvFilter::new("info"), false),
            _ => (EnvFilter::new("debug"), false),
        },
    };

    let (filter, handle) = reload::Layer::new(initial);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| CliError::general(format!("cannot initialize logging: {e}")))?;

    Ok(from_settings.then_some(LogReloader(handle)))
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn file(msg: impl Into<String>) -> Self {
        Self { code: EXIT_FILE, message: msg.into(), hint: None }
    }

    pub fn io(err: IoError) -> Self {
        let hint = match &err {
            IoError::UnsupportedFormat { .. } => {
                Some("supported: .csv .tsv .txt .xlsx .xlsm .xls .xlsb .ods".to_string())
            }
            IoError::UnknownSheet { available, .. } => {
                Some(format!("available sheets: {}", available.join(", ")))
            }
            _ => None,
        };
        Self { code: EXIT_FILE, message: err.to_string(), hint }
    }

    /// Engine error; with a table, unknown-column errors list its columns.
    pub fn recon(err: ReconError, table: Option<&Table>) -> Self {
        let hint = match (&err, table) {
            (ReconError::UnknownColumn { .. }, Some(table)) => {
                Some(format!("available columns: {}", table.columns().join(", ")))
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn settings(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Delimiter { .. } => None,
            _ => Some(format!("default location: {}", Settings::config_path().display())),
        };
        Self { code: EXIT_SETTINGS, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
