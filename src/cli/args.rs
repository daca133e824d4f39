//! CLI argument parsing using clap.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{
    Parser,
    builder::styling::{AnsiColor, Effects, Styles},
};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Re-run a command whenever a watched file changes
#[derive(Parser, Debug)]
#[command(
    name = "onsave",
    version = env!("CARGO_PKG_VERSION"),
    about = "Re-run a command whenever a watched file changes",
    override_usage = "onsave --file <PATH>... [--debounce <DURATION>] -- <COMMAND> [ARGS]...",
    after_help = "Examples:\n  \
        $ onsave --file src/main.c -- make\n  \
        $ onsave -file a.txt -file b.txt -debounce 500ms -- ./build.sh --fast",
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// File to watch (repeatable)
    #[arg(long = "file", value_name = "PATH", required = true)]
    pub files: Vec<PathBuf>,

    /// Minimum time between runs per file, e.g. 500ms, 2s, 1m 30s (0 disables)
    #[arg(
        long,
        value_name = "DURATION",
        env = "ONSAVE_DEBOUNCE",
        default_value = "0",
        value_parser = parse_debounce
    )]
    pub debounce: Duration,

    /// Log filter, e.g. info, debug, watcher=debug (RUST_LOG takes precedence)
    #[arg(
        long,
        value_name = "FILTER",
        env = "ONSAVE_LOG_LEVEL",
        default_value = "info"
    )]
    pub log_level: String,

    /// Command to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Long flags that also accept the single-dash spelling.
const LONG_FLAGS: &[(&str, bool)] = &[
    ("file", true),
    ("debounce", true),
    ("log-level", true),
    ("help", false),
    ("version", false),
];

/// Parse a debounce interval.
///
/// Accepts humantime durations plus a bare `0`.
pub fn parse_debounce(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if value == "0" {
        return Ok(Duration::ZERO);
    }

    humantime::parse_duration(value).map_err(|e| format!("invalid duration '{value}': {e}"))
}

/// Rewrite single-dash long flags (`-file x`, `-debounce=1s`) to `--` form.
///
/// Stops at `--` or at the first positional argument, so the command's own
/// arguments pass through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut out: Vec<OsString> = Vec::new();

    // Binary name
    if let Some(bin) = args.next() {
        out.push(bin);
    }

    let mut expect_value = false;
    for arg in args.by_ref() {
        if expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }

        let text = match arg.to_str() {
            Some(text) => text.to_owned(),
            None => {
                out.push(arg);
                break;
            }
        };

        if text == "--" || text == "-" || !text.starts_with('-') {
            out.push(arg);
            break;
        }

        let flag = text.trim_start_matches('-');
        let (name, has_inline_value) = match flag.split_once('=') {
            Some((name, _)) => (name, true),
            None => (flag, false),
        };

        match LONG_FLAGS.iter().find(|(long, _)| *long == name) {
            Some((_, takes_value)) => {
                expect_value = *takes_value && !has_inline_value;
                out.push(format!("--{flag}").into());
            }
            None => out.push(arg),
        }
    }

    out.extend(args);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(normalize_args(args.iter().copied()))
    }

    #[test]
    fn test_double_dash_flags() {
        let cli = parse(&["onsave", "--file", "a.txt", "--debounce", "500ms", "--", "make"]).unwrap();

        assert_eq!(cli.files, vec![PathBuf::from("a.txt")]);
        assert_eq!(cli.debounce, Duration::from_millis(500));
        assert_eq!(cli.command, vec!["make"]);
    }

    #[test]
    fn test_single_dash_flags() {
        let cli = parse(&[
            "onsave", "-file", "a.txt", "-file=b.txt", "-debounce=2s", "--", "make", "test",
        ])
        .unwrap();

        assert_eq!(
            cli.files,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
        assert_eq!(cli.debounce, Duration::from_secs(2));
        assert_eq!(cli.command, vec!["make", "test"]);
    }

    #[test]
    fn test_command_without_separator() {
        let cli = parse(&["onsave", "--file", "a.txt", "cargo", "test", "--release"]).unwrap();
        assert_eq!(cli.command, vec!["cargo", "test", "--release"]);
    }

    #[test]
    fn test_command_flags_are_not_rewritten() {
        let args = normalize_args(["onsave", "-file", "a", "--", "tool", "-file", "x"]);
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();

        assert_eq!(
            args,
            vec!["onsave", "--file", "a", "--", "tool", "-file", "x"]
        );
    }

    #[test]
    fn test_flag_value_is_not_rewritten() {
        let args = normalize_args(["onsave", "-file", "-debounce", "make"]);
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();

        assert_eq!(args, vec!["onsave", "--file", "-debounce", "make"]);
    }

    #[test]
    fn test_default_debounce_is_zero() {
        let cli = parse(&["onsave", "--file", "a.txt", "--", "make"]).unwrap();
        assert_eq!(cli.debounce, Duration::ZERO);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(parse(&["onsave", "--", "make"]).is_err());
    }

    #[test]
    fn test_missing_command_is_error() {
        assert!(parse(&["onsave", "--file", "a.txt"]).is_err());
    }

    #[test]
    fn test_parse_debounce() {
        assert_eq!(parse_debounce("0"), Ok(Duration::ZERO));
        assert_eq!(parse_debounce("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_debounce("2s"), Ok(Duration::from_secs(2)));
        assert_eq!(parse_debounce("1m 30s"), Ok(Duration::from_secs(90)));
        assert!(parse_debounce("soon").is_err());
        assert!(parse_debounce("").is_err());
    }
}
