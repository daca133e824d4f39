//! Subscription to operating system change notifications.

use std::path::Path;

use crossbeam_channel::{Receiver, Sender, unbounded};
use notify::{Event, RecursiveMode, Watcher};

use super::error::WatchError;
use super::event::ChangeEvent;

/// An open notify watcher with every requested directory registered.
///
/// Dropping the subscription stops the watcher and disconnects both
/// channels.
pub struct Subscription {
    /// Change events, one per path.
    events: Receiver<ChangeEvent>,
    /// Errors reported by the backend after startup.
    errors: Receiver<WatchError>,
    /// The underlying file watcher.
    _watcher: notify::RecommendedWatcher,
}

impl Subscription {
    /// Open a watcher and register each directory non-recursively.
    ///
    /// Any registration failure aborts the whole subscription.
    pub fn open<'a>(dirs: impl IntoIterator<Item = &'a Path>) -> Result<Self, WatchError> {
        let (event_tx, event_rx) = unbounded();
        let (error_tx, error_rx) = unbounded();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            forward(res, &event_tx, &error_tx);
        })?;

        for dir in dirs {
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| WatchError::PathWatchFailed {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                })?;
            crate::debug_event!("watcher", "subscribed", "{}", dir.display());
        }

        Ok(Self {
            events: event_rx,
            errors: error_rx,
            _watcher: watcher,
        })
    }

    pub fn events(&self) -> &Receiver<ChangeEvent> {
        &self.events
    }

    pub fn errors(&self) -> &Receiver<WatchError> {
        &self.errors
    }
}

/// Route one backend callback onto the event and error channels.
///
/// A rescan flag means the backend dropped notifications (inotify queue
/// overflow); it carries no paths, so it is surfaced as an error.
fn forward(res: notify::Result<Event>, events: &Sender<ChangeEvent>, errors: &Sender<WatchError>) {
    // Send failures mean the dispatch loop is gone; nothing left to notify.
    match res {
        Ok(event) => {
            if event.need_rescan() {
                let _ = errors.send(WatchError::EventError {
                    details: "event queue overflowed; changes may have been missed".to_string(),
                });
            }
            for change in ChangeEvent::from_notify(event) {
                let _ = events.send(change);
            }
        }
        Err(e) => {
            let _ = errors.send(WatchError::EventError {
                details: e.to_string(),
            });
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        crate::debug_event!("watcher", "released subscription");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::ChangeKind;
    use notify::EventKind;
    use notify::event::{DataChange, Flag, ModifyKind};
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    #[test]
    fn test_overflow_is_reported_as_error() {
        let (event_tx, event_rx) = unbounded();
        let (error_tx, error_rx) = unbounded();

        let overflow = Event::new(EventKind::Other).set_flag(Flag::Rescan);
        forward(Ok(overflow), &event_tx, &error_tx);

        let err = error_rx.try_recv().unwrap();
        assert!(matches!(err, WatchError::EventError { ref details } if details.contains("overflowed")));
        assert!(event_rx.try_recv().is_err());
    }

    #[test]
    fn test_forward_splits_events_and_errors() {
        let (event_tx, event_rx) = unbounded();
        let (error_tx, error_rx) = unbounded();

        let write = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/watched/a.txt"));
        forward(Ok(write), &event_tx, &error_tx);
        forward(Err(notify::Error::generic("backend hiccup")), &event_tx, &error_tx);

        assert_eq!(
            event_rx.try_recv().unwrap(),
            ChangeEvent::new("/watched/a.txt", ChangeKind::Write)
        );
        let err = error_rx.try_recv().unwrap();
        assert!(err.to_string().contains("backend hiccup"));
        assert!(error_rx.try_recv().is_err());
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = Subscription::open([missing.as_path()]).err().unwrap();
        assert!(matches!(err, WatchError::PathWatchFailed { ref path, .. } if *path == missing));
    }

    #[test]
    fn test_write_is_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let file = root.join("watched.txt");
        std::fs::write(&file, "one").unwrap();

        let subscription = Subscription::open([root.as_path()]).unwrap();
        std::fs::write(&file, "two").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = false;
        while Instant::now() < deadline {
            match subscription
                .events()
                .recv_timeout(Duration::from_millis(200))
            {
                Ok(event) if event.path == file && event.kind.is_actionable() => {
                    seen = true;
                    break;
                }
                _ => continue,
            }
        }

        assert!(seen, "no actionable event for {}", file.display());
    }
}
