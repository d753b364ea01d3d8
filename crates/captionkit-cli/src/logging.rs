use std::path::Path;
use std::sync::OnceLock;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Log file prefix inside `--log-dir`
const LOG_FILE_NAME: &str = "captionkit.log";

/// Installs the global subscriber: stderr always, plus a daily file when `log_dir` is set.
///
/// `RUST_LOG` wins over the default level (`info`, or `debug` with `verbose`).
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries documents, so logs go to stderr
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions));

    let file_layer = log_dir.and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Failed to create log directory {}: {}", dir.display(), e);
            return None;
        }
        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
    });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer);

    // Avoid panics if already initialized (tests)
    let _ = tracing::subscriber::set_global_default(subscriber);
}
