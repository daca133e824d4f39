//! Logging for the watcher.
//!
//! Provides compact timestamped logging on stderr with per-module level
//! configuration, so the child command keeps stdout to itself. Supports
//! `RUST_LOG` for runtime overrides:
//! ```bash
//! RUST_LOG=debug onsave --file a.txt -- make
//! RUST_LOG=onsave::watcher=trace onsave --file a.txt -- make
//! ```

use std::sync::Once;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Wall-clock timer for log lines, e.g. `14:02:07.318`.
struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.format("%H:%M:%S%.3f"))
    }
}

/// Initialize logging with configuration.
///
/// Call once at startup. Safe to call multiple times (only first call takes effect).
/// The `RUST_LOG` environment variable takes precedence over config settings.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
                eprintln!("Invalid log filter '{}': {e}", config.filter);
                EnvFilter::new("info")
            })
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(ClockTime)
            .with_level(true)
            .with_filter(filter);

        // A subscriber may already be installed (e.g. by a test harness)
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}

/// Log a watcher or command milestone at info level.
///
/// Lines read `[source] what: detail`.
///
/// # Examples
/// ```ignore
/// log_event!("watcher", "watching", "{}", path.display());
/// log_event!("command", "running", "{command}");
/// log_event!("watcher", "notification channel closed");
/// ```
#[macro_export]
macro_rules! log_event {
    ($source:expr, $what:expr) => {
        tracing::info!("[{}] {}", $source, $what)
    };
    ($source:expr, $what:expr, $($detail:tt)*) => {
        tracing::info!("[{}] {}: {}", $source, $what, format!($($detail)*))
    };
}

/// Same line shape as [`log_event!`], at debug level. Used for filter
/// decisions and lifecycle noise.
///
/// # Examples
/// ```ignore
/// debug_event!("watcher", "debounced", "{event}");
/// debug_event!("command", "finished", "{command}");
/// ```
#[macro_export]
macro_rules! debug_event {
    ($source:expr, $what:expr) => {
        tracing::debug!("[{}] {}", $source, $what)
    };
    ($source:expr, $what:expr, $($detail:tt)*) => {
        tracing::debug!("[{}] {}: {}", $source, $what, format!($($detail)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_time_is_millisecond_wall_clock() {
        let mut buf = String::new();
        ClockTime.format_time(&mut Writer::new(&mut buf)).unwrap();

        // HH:MM:SS.mmm
        assert_eq!(buf.len(), 12, "{buf}");
        let bytes = buf.as_bytes();
        assert_eq!((bytes[2], bytes[5], bytes[8]), (b':', b':', b'.'));
        assert!(buf.chars().filter(char::is_ascii_digit).count() == 9);
    }

    #[test]
    fn test_event_macros_accept_both_forms() {
        let command = "make all";
        crate::log_event!("watcher", "notification channel closed");
        crate::log_event!("command", "running", "{command}");
        crate::debug_event!("command", "finished", "{command}");
    }
}
