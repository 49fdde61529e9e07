//! Logging configuration for milestoned.
//!
//! This module provides initialization and configuration for the tracing-based
//! logging system, including the per-request logging emitted by the HTTP layer.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Normal output level (info and above).
    #[default]
    Normal,
    /// Verbose output (debug and above).
    Verbose,
    /// Very verbose output (trace level).
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Initialize the logging system.
///
/// This should be called once at application startup. The logging level can
/// be controlled via the `verbosity` parameter or the `RUST_LOG` environment
/// variable (which takes precedence). Request logging from tower-http is
/// included one level below the crate's own output so `-v` surfaces it.
pub fn init_logging(verbosity: Verbosity) {
    let level = verbosity.to_level_filter();
    let default_filter = format!("milestoned={level},tower_http=debug");

    // Allow RUST_LOG to override
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    // Install the subscriber (ignore error if already set)
    let _ = subscriber.try_init();
}

/// Initialize logging for tests.
///
/// Only logs warnings and errors by default to keep test output clean.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_to_level() {
        assert_eq!(Verbosity::Quiet.to_level_filter(), Level::ERROR);
        assert_eq!(Verbosity::Normal.to_level_filter(), Level::INFO);
        assert_eq!(Verbosity::Verbose.to_level_filter(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level_filter(), Level::TRACE);
    }

    #[test]
    fn test_verbosity_default() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_init_logging_does_not_panic() {
        // The subscriber may already be set from a previous test, which is
        // fine; the function ignores the error.
        init_logging(Verbosity::Normal);
        init_logging(Verbosity::Quiet);
    }

    #[test]
    fn test_init_test_logging_does_not_panic() {
        init_test_logging();
    }
}
