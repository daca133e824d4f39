//! External command execution.
//!
//! The configured command runs in the foreground with the parent's standard
//! streams. Failures are returned to the caller to log; they never stop the
//! watcher.

use std::fmt;
use std::io;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

/// Errors from running the configured command.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command line is empty")]
    Empty,

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' exited unsuccessfully ({status})")]
    Failed { command: String, status: ExitStatus },
}

/// Program and arguments to run on every accepted change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Build from a command line whose first element is the program.
    pub fn new(argv: impl IntoIterator<Item = String>) -> Result<Self, CommandError> {
        let mut argv = argv.into_iter();
        let program = argv.next().ok_or(CommandError::Empty)?;
        if program.is_empty() {
            return Err(CommandError::Empty);
        }

        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs a command to completion.
///
/// Implementations block until the command finishes.
pub trait CommandExecutor {
    fn execute(&mut self, command: &CommandSpec) -> Result<(), CommandError>;
}

/// Executor that spawns a child process attached to the terminal.
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute(&mut self, command: &CommandSpec) -> Result<(), CommandError> {
        crate::log_event!("command", "running", "{command}");

        let status = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| CommandError::Spawn {
                program: command.program().to_string(),
                source,
            })?;

        if status.success() {
            crate::debug_event!("command", "finished", "{command}");
            Ok(())
        } else {
            Err(CommandError::Failed {
                command: command.to_string(),
                status,
            })
        }
    }
}
