use std::env;
use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/page-order.log";

/// Targets this tool logs under: the engine library and the binary itself.
const OWN_TARGETS: [&str; 2] = ["page_order_core", "page_order"];

/// Filter directive for one run.
///
/// A `TRACING_LEVEL` holding a full directive (anything with `=`) is used as
/// given. Otherwise it is the level for our own targets, raised by `-v`, while
/// dependencies stay at `warn`.
fn filter_directive(tracing_level: Option<&str>, verbosity: u8) -> String {
    if let Some(level) = tracing_level.filter(|l| l.contains('=')) {
        return level.to_string();
    }
    let level = match (verbosity, tracing_level) {
        (0, Some(level)) => level,
        (0, None) => "info",
        (1, _) => "debug",
        _ => "trace",
    };
    let mut directive = String::from("warn");
    for target in OWN_TARGETS {
        directive.push_str(&format!(",{}={}", target, level));
    }
    directive
}

/// Compact stderr output for the user plus a plain-text log file
/// (`LOG_FILE_PATH`). Stdout is left to command results.
pub fn init_logger(verbosity: u8, command: &str) -> WorkerGuard {
    let tracing_level = env::var("TRACING_LEVEL").ok();
    let directive = filter_directive(tracing_level.as_deref(), verbosity);

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let log_file = Path::new(&log_file_path);
    let log_dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_name = log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "page-order.log".into());

    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .with(EnvFilter::new(&directive))
        .init();

    info!(command, filter = %directive, "Logging to {}", log_file_path);

    guard
}
