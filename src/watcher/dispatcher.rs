//! Dispatch loop: filter change events, debounce them, run the command.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, never, select};

use super::debouncer::Debouncer;
use super::error::WatchError;
use super::event::{ChangeEvent, ChangeKind};
use super::watch_set::{WatchSet, normalize_path};
use crate::command::{CommandExecutor, CommandSpec};

/// State of the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Result of running a change event through the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Run the command for this path.
    Accepted(PathBuf),
    /// Path is not in the watch set (possibly a sibling in a watched dir).
    NotWatched,
    /// Watched path, but the change kind never triggers.
    IgnoredKind(ChangeKind),
    /// Within the debounce interval of the last trigger.
    Debounced,
}

/// Owns the watch set, debounce state and executor for the loop.
pub struct Dispatcher<E: CommandExecutor> {
    watch_set: WatchSet,
    debouncer: Debouncer,
    command: CommandSpec,
    executor: E,
    state: LoopState,
}

impl<E: CommandExecutor> Dispatcher<E> {
    pub fn new(watch_set: WatchSet, debounce: Duration, command: CommandSpec, executor: E) -> Self {
        Self {
            watch_set,
            debouncer: Debouncer::new(debounce),
            command,
            executor,
            state: LoopState::Running,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[cfg(test)]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Decide whether an event should run the command.
    ///
    /// Checks run in order: path membership, change kind, debounce. Only
    /// an accepted event updates debounce state.
    pub fn filter(&mut self, event: &ChangeEvent, now: Instant) -> FilterOutcome {
        let path = match normalize_path(&event.path) {
            Ok(path) => path,
            Err(e) => {
                crate::debug_event!("watcher", "unresolvable event path", "{e}");
                return FilterOutcome::NotWatched;
            }
        };

        if !self.watch_set.contains(&path) {
            return FilterOutcome::NotWatched;
        }

        if !event.kind.is_actionable() {
            return FilterOutcome::IgnoredKind(event.kind);
        }

        if !self.debouncer.should_trigger(&path, now) {
            return FilterOutcome::Debounced;
        }

        FilterOutcome::Accepted(path)
    }

    /// Filter one event and run the command if it passes.
    ///
    /// Returns true when the command was run, whether or not it succeeded.
    pub fn handle_event(&mut self, event: &ChangeEvent, now: Instant) -> bool {
        match self.filter(event, now) {
            FilterOutcome::Accepted(path) => {
                crate::log_event!("watcher", "changed", "{} {}", event.kind, path.display());
                if let Err(e) = self.executor.execute(&self.command) {
                    tracing::warn!("[command] {e}");
                }
                true
            }
            FilterOutcome::NotWatched => {
                crate::debug_event!("watcher", "unmatched", "{event}");
                false
            }
            FilterOutcome::IgnoredKind(kind) => {
                crate::debug_event!("watcher", "ignored", "{kind} {}", event.path.display());
                false
            }
            FilterOutcome::Debounced => {
                crate::debug_event!("watcher", "debounced", "{event}");
                false
            }
        }
    }

    /// Run until the event channel closes.
    ///
    /// Notification errors are logged and do not stop the loop. Events are
    /// handled one at a time; anything arriving while the command runs waits
    /// in the channel.
    pub fn run(
        &mut self,
        events: &Receiver<ChangeEvent>,
        errors: &Receiver<WatchError>,
    ) -> LoopState {
        let mut errors = errors.clone();

        while self.state == LoopState::Running {
            let mut errors_closed = false;

            select! {
                recv(events) -> msg => match msg {
                    Ok(event) => {
                        self.handle_event(&event, Instant::now());
                    }
                    // Only reported once buffered events are drained
                    Err(_) => self.state = LoopState::Terminated,
                },
                recv(errors) -> msg => match msg {
                    Ok(e) => tracing::error!("[watcher] {e}"),
                    Err(_) => errors_closed = true,
                },
            }

            if errors_closed {
                errors = never();
            }
        }

        crate::log_event!("watcher", "notification channel closed");
        self.state
    }
}
