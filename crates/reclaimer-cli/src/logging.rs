use std::env;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_LOG_FILE: &str = "./logs/reclaimer.log";

/// Console output level while a command writes machine-readable data to stdout.
const QUIET_CONSOLE_LEVEL: &str = "warn";

/// Log to stderr and to `LOG_FILE_PATH`; the returned guard flushes the file writer on drop.
///
/// With `quiet`, the console only shows warnings and errors. The log file always gets the
/// `TRACING_LEVEL` filter.
pub fn init_logger(quiet: bool) -> impl Drop {
    let level = env::var("TRACING_LEVEL").unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
    let console_level = if quiet {
        QUIET_CONSOLE_LEVEL.to_string()
    } else {
        level.clone()
    };

    let log_file_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file_appender = tracing_appender::rolling::never("./", log_file_path);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .pretty()
        .with_file(false)
        .without_time()
        .with_ansi(true)
        .with_filter(EnvFilter::new(console_level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    info!(quiet, "Tracing is configured for stderr and file logging.");

    guard
}
