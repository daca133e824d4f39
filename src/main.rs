use std::fmt::Display;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use onsave::cli::{Cli, normalize_args};
use onsave::watcher::{Dispatcher, Subscription, WatchSet};
use onsave::{ProcessExecutor, Settings, logging};

/// Exit status for usage and configuration errors.
const EXIT_USAGE: i32 = 1;

fn main() {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are reported through the error path too
            process::exit(if e.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };

    let settings = match Settings::from_cli(cli) {
        Ok(settings) => settings,
        Err(e) => usage_error(e),
    };

    logging::init_with_config(&settings.logging);

    let watch_set = match WatchSet::resolve(&settings.files) {
        Ok(watch_set) => watch_set,
        Err(e) => usage_error(e),
    };

    if let Err(e) = run(settings, watch_set) {
        tracing::error!("{e:#}");
        process::exit(1);
    }
}

fn usage_error(err: impl Display) -> ! {
    eprintln!("Error: {err}\n");
    eprintln!("{}", Cli::command().render_usage());
    process::exit(EXIT_USAGE);
}

fn run(settings: Settings, watch_set: WatchSet) -> anyhow::Result<()> {
    let subscription = Subscription::open(watch_set.watch_dirs())
        .context("failed to subscribe to file change notifications")?;

    for path in watch_set.paths() {
        onsave::log_event!("watcher", "watching", "{}", path.display());
    }
    onsave::debug_event!(
        "watcher",
        "ready",
        "{} files in {} directories",
        watch_set.path_count(),
        watch_set.dir_count()
    );
    if !settings.debounce.is_zero() {
        onsave::debug_event!(
            "watcher",
            "debounce",
            "{}",
            humantime::format_duration(settings.debounce)
        );
    }

    let mut dispatcher = Dispatcher::new(
        watch_set,
        settings.debounce,
        settings.command,
        ProcessExecutor::new(),
    );

    dispatcher.run(subscription.events(), subscription.errors());
    Ok(())
}
