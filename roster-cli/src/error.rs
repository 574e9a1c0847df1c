use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use std::process;

/// Exit codes for the CLI.
#[allow(dead_code)]
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Error from the crawl, store, or search layers.
    Pipeline(roster_core::Error),
    /// No store file at the given path.
    NoStore(PathBuf),
    /// Argument / usage errors.
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Pipeline(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::NoStore(path) => write!(
                f,
                "{} no store file at '{}'\n  {} run 'roster crawl' first to build one",
                "error:".red().bold(),
                path.display(),
                "help:".cyan().bold(),
            ),
            CliError::Usage(msg) => write!(f, "{} {msg}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<roster_core::Error> for CliError {
    fn from(e: roster_core::Error) -> Self {
        match e {
            roster_core::Error::InvalidRange(msg) => CliError::Usage(msg),
            other => CliError::Pipeline(other),
        }
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    let code = match &err {
        CliError::Usage(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    };
    process::exit(code)
}

pub type CliResult<T> = std::result::Result<T, CliError>;
