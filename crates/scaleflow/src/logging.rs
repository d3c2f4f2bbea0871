//! Logging initialization.
//!
//! Uses the `tracing` ecosystem with either human-readable or JSON output.
//! Logs always go to stderr; stdout carries the report.

use scaleflow_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem at `level`.
///
/// The RUST_LOG environment variable overrides `level` when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section.
///
/// `--verbose` raises the level to at least debug; `--json-logs` forces JSON.
pub fn init_from_config(config: &Config, verbose_override: bool, json_logs_override: bool) {
    let level = effective_level(&config.logging.level, verbose_override);
    let json_format = json_logs_override || config.logging.format == "json";
    init(level, json_format);
}

fn effective_level(configured: &str, verbose: bool) -> &str {
    match (verbose, configured) {
        (true, "trace") => "trace",
        (true, _) => "debug",
        (false, level) => level,
    }
}
