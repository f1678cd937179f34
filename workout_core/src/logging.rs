//! Tracing setup for the coach binary and tests.
//!
//! stdout carries the session transcript, so every log line goes to stderr.
//! `COACH_LOG` takes precedence over `RUST_LOG`; both accept `EnvFilter`
//! directives such as `workout_core=debug`.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crate-specific filter variable, checked before `RUST_LOG`
pub const LOG_ENV: &str = "COACH_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

pub fn init() {
    init_with_level(DEFAULT_DIRECTIVES)
}

/// Install the global subscriber, using `default_level` when neither
/// environment variable is set or parses
pub fn init_with_level(default_level: &str) {
    let coach_log = std::env::var(LOG_ENV).ok();
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(coach_log.as_deref(), rust_log.as_deref(), default_level);

    let stderr_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}

/// First of `coach_log`, `rust_log`, `default_level` that parses as a filter
fn build_filter(coach_log: Option<&str>, rust_log: Option<&str>, default_level: &str) -> EnvFilter {
    [coach_log, rust_log]
        .into_iter()
        .flatten()
        .filter(|d| !d.trim().is_empty())
        .find_map(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("workout_core=debug"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coach_log_wins_over_rust_log() {
        let filter = build_filter(Some("workout_core=trace"), Some("error"), "warn");
        assert_eq!(filter.to_string(), "workout_core=trace");
    }

    #[test]
    fn test_falls_back_past_unset_values() {
        let filter = build_filter(Some("  "), Some("info"), "warn");
        assert_eq!(filter.to_string(), "info");

        let filter = build_filter(None, None, "warn");
        assert_eq!(filter.to_string(), "warn");
    }
}
