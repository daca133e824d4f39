//! CLI module for the onsave watcher.
//!
//! Provides command-line interface parsing.

pub mod args;

pub use args::{Cli, normalize_args, parse_debounce};
