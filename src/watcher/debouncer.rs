//! Per-path debouncing of command triggers.
//!
//! Editors often emit several notifications for a single save (truncate,
//! write, rename-into-place). The debouncer lets the first one through and
//! suppresses the rest until the interval has passed for that path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Tracks the last accepted trigger per path.
///
/// Entries are never evicted; the watch set is fixed at startup so the map
/// cannot grow past it.
#[derive(Debug)]
pub struct Debouncer {
    /// Last accepted trigger: path -> timestamp.
    last_trigger: HashMap<PathBuf, Instant>,
    /// Minimum time between accepted triggers on the same path.
    interval: Duration,
}

impl Debouncer {
    /// Create a debouncer. A zero interval disables debouncing.
    pub fn new(interval: Duration) -> Self {
        Self {
            last_trigger: HashMap::new(),
            interval,
        }
    }

    /// Decide whether a change on `path` at `now` should trigger.
    ///
    /// Records `now` as the last trigger when it does. A path seen for the
    /// first time always triggers.
    pub fn should_trigger(&mut self, path: &Path, now: Instant) -> bool {
        if self.interval.is_zero() {
            return true;
        }

        if let Some(last) = self.last_trigger.get(path) {
            if now.saturating_duration_since(*last) < self.interval {
                return false;
            }
        }

        self.last_trigger.insert(path.to_path_buf(), now);
        true
    }

    /// Number of paths with a recorded trigger.
    #[cfg(test)]
    pub fn tracked_count(&self) -> usize {
        self.last_trigger.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_event_always_triggers() {
        let mut debouncer = Debouncer::new(Duration::from_secs(3600));
        assert!(debouncer.should_trigger(Path::new("/test/file.rs"), Instant::now()));
    }

    #[test]
    fn test_suppresses_within_interval() {
        let mut debouncer = Debouncer::new(ms(100));
        let path = Path::new("/test/file.rs");
        let t0 = Instant::now();

        assert!(debouncer.should_trigger(path, t0));
        assert!(!debouncer.should_trigger(path, t0 + ms(99)));
        // Exactly the interval is enough
        assert!(debouncer.should_trigger(path, t0 + ms(100)));
    }

    #[test]
    fn test_suppressed_events_do_not_extend_window() {
        let mut debouncer = Debouncer::new(ms(1000));
        let path = Path::new("/watched/a.txt");
        let t0 = Instant::now();

        assert!(debouncer.should_trigger(path, t0));
        assert!(!debouncer.should_trigger(path, t0 + ms(500)));
        assert!(!debouncer.should_trigger(path, t0 + ms(900)));
        // Measured from the accepted trigger at t0, not from 900ms
        assert!(debouncer.should_trigger(path, t0 + ms(1200)));
        assert!(!debouncer.should_trigger(path, t0 + ms(1700)));
    }

    #[test]
    fn test_zero_interval_always_triggers() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        let path = Path::new("/test/file.rs");
        let t0 = Instant::now();

        for _ in 0..5 {
            assert!(debouncer.should_trigger(path, t0));
        }
        assert_eq!(debouncer.tracked_count(), 0);
    }

    #[test]
    fn test_paths_are_independent() {
        let mut debouncer = Debouncer::new(ms(1000));
        let a = Path::new("/watched/a.txt");
        let b = Path::new("/watched/b.txt");
        let t0 = Instant::now();

        assert!(debouncer.should_trigger(a, t0));
        assert!(debouncer.should_trigger(b, t0));
        assert!(!debouncer.should_trigger(a, t0 + ms(10)));
        assert!(!debouncer.should_trigger(b, t0 + ms(10)));
        assert_eq!(debouncer.tracked_count(), 2);
    }

    #[test]
    fn test_clock_going_backwards_is_suppressed() {
        let mut debouncer = Debouncer::new(ms(100));
        let path = Path::new("/test/file.rs");
        let t0 = Instant::now() + ms(500);

        assert!(debouncer.should_trigger(path, t0));
        assert!(!debouncer.should_trigger(path, t0 - ms(200)));
    }
}
