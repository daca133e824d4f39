//! File watcher that re-runs a command on change.
//!
//! # Architecture
//!
//! ```text
//! Subscription (notify::RecommendedWatcher on parent dirs)
//!   |  ChangeEvent / WatchError channels
//!   v
//! Dispatcher
//!   - WatchSet   (exact file membership)
//!   - Debouncer  (per-path last trigger)
//!   - CommandExecutor
//! ```

mod debouncer;
mod dispatcher;
mod error;
mod event;
mod subscription;
mod watch_set;

pub use debouncer::Debouncer;
pub use dispatcher::{Dispatcher, FilterOutcome, LoopState};
pub use error::WatchError;
pub use event::{ChangeEvent, ChangeKind};
pub use subscription::Subscription;
pub use watch_set::{WatchSet, clean_path, normalize_path};
