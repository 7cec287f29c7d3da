//! Structured logging for the watchdog.
//!
//! Log lines go to stderr so that command output on stdout (`once`, `check`)
//! stays machine-readable.

use std::io;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Logging format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Pretty human-readable output
    #[default]
    Pretty,
    /// JSON output for log aggregation
    Json,
    /// Compact single-line output
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format (pretty, json, compact)
    pub format: LogFormat,
    /// Minimum log level when `RUST_LOG` is unset
    pub level: Level,
    /// Include target (module path)
    pub with_target: bool,
    /// Include file name and line number
    pub with_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: Level::INFO,
            with_target: true,
            with_file: false,
        }
    }
}

impl LogConfig {
    /// Config for JSON logging under a service manager.
    pub const fn json() -> Self {
        Self {
            format: LogFormat::Json,
            level: Level::INFO,
            with_target: true,
            with_file: false,
        }
    }

    /// Config for interactive debugging.
    pub const fn development() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: Level::DEBUG,
            with_target: false,
            with_file: true,
        }
    }

    /// Picks a preset from the command-line flags.
    ///
    /// JSON output keeps the production preset (with `-v` lowering the level);
    /// otherwise `-v` switches to the development preset in the chosen format.
    pub const fn from_flags(format: LogFormat, verbose: bool) -> Self {
        match (format, verbose) {
            (LogFormat::Json, false) => Self::json(),
            (LogFormat::Json, true) => Self::json().level(Level::DEBUG),
            (format, true) => Self::development().format(format),
            (format, false) => Self {
                format,
                level: Level::INFO,
                with_target: true,
                with_file: false,
            },
        }
    }

    /// Set the log level.
    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the log format.
    #[must_use]
    pub const fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup. `RUST_LOG` overrides `config.level` when set.
/// A second call is a no-op.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    match config.format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(config.with_target)
                    .with_file(config.with_file)
                    .with_line_number(config.with_file)
                    .with_writer(io::stderr),
            );
            let _ = tracing::subscriber::set_global_default(subscriber);
        },
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .json()
                    .with_target(config.with_target)
                    .with_file(config.with_file)
                    .with_line_number(config.with_file)
                    .with_writer(io::stderr),
            );
            let _ = tracing::subscriber::set_global_default(subscriber);
        },
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .compact()
                    .with_ansi(true)
                    .with_target(config.with_target)
                    .with_file(config.with_file)
                    .with_line_number(config.with_file)
                    .with_writer(io::stderr),
            );
            let _ = tracing::subscriber::set_global_default(subscriber);
        },
    }
}
