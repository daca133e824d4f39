pub mod cli;
pub mod command;
pub mod config;
pub mod logging;
pub mod watcher;

pub use command::{CommandError, CommandExecutor, CommandSpec, ProcessExecutor};
pub use config::{LoggingConfig, Settings};
pub use watcher::{
    ChangeEvent, ChangeKind, Dispatcher, FilterOutcome, LoopState, Subscription, WatchError,
    WatchSet,
};
