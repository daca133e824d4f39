//! Runtime settings for the watcher.
//!
//! Settings are assembled once at startup from the command line. There is
//! no configuration file; environment overrides arrive through clap:
//! - `ONSAVE_DEBOUNCE=500ms` sets the debounce interval
//! - `ONSAVE_LOG_LEVEL=debug` sets the log filter
//! - `RUST_LOG` overrides the log filter entirely

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::command::{CommandError, CommandSpec};

/// Logging configuration.
///
/// `filter` is an `EnvFilter` directive: a bare level such as `debug`, or a
/// list with per-module overrides such as `info,onsave::watcher=trace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Paths as given by the user; resolved by `WatchSet::resolve`.
    pub files: Vec<PathBuf>,
    /// Minimum interval between triggers per path.
    pub debounce: Duration,
    /// Command to run on every accepted change.
    pub command: CommandSpec,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Build settings from parsed arguments.
    pub fn from_cli(cli: Cli) -> Result<Self, CommandError> {
        let command = CommandSpec::new(cli.command)?;

        Ok(Self {
            files: cli.files,
            debounce: cli.debounce,
            command,
            logging: LoggingConfig {
                filter: cli.log_level,
            },
        })
    }
}
