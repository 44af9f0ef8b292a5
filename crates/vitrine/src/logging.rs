//! Logging initialization.
//!
//! The configured `logging.level` string drives the default filter
//! directly, so all five levels are honored; `--verbose` only ever
//! raises verbosity, never lowers it. Output goes to stderr because
//! stdout carries query/fetch data.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Resolve the effective level from the configured string and the CLI
/// `--verbose` flag. Unknown level strings fall back to "info".
fn effective_level(configured: &str, verbose: bool) -> &'static str {
    let configured = LEVELS
        .iter()
        .find(|l| **l == configured)
        .copied()
        .unwrap_or("info");
    if verbose && configured != "trace" {
        "debug"
    } else {
        configured
    }
}

/// Initialize the logging subsystem at the given default level.
///
/// The RUST_LOG environment variable overrides the level when set.
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

/// Initialize logging from the Vitrine config, with CLI overrides.
pub fn init_from_config(
    config: &vitrine_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let level = effective_level(&config.logging.level, verbose_override);
    let json_format = json_logs_override || config.logging.format == "json";
    init(level, json_format);
}
