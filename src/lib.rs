// =============================================================================
// Lint Configuration
// =============================================================================

#![deny(unsafe_code)]
// Correctness: Must handle all fallible operations
#![deny(unused_must_use)]
// Quality: Pedantic but pragmatic
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![allow(missing_debug_implementations)] // Orchestrator holds trait objects

// Allowed with documented reasons
#![allow(clippy::missing_errors_doc)] // Error returns self-documenting via type
#![allow(clippy::module_name_repetitions)] // e.g., config::WatchdogConfig is clearer
#![allow(clippy::doc_markdown)] // Too many false positives in code docs
#![allow(clippy::must_use_candidate)] // Not all returned values need annotation
#![allow(clippy::cast_possible_truncation)] // Millisecond counts fit in u64
#![allow(clippy::cast_sign_loss)] // Values are checked non-negative first

//! Log rotation watchdog for supervised processes.
//!
//! A long-running worker polls on a fixed period. Each tick it asks the
//! process inventory which log files exist, adds the supervisor's own logs,
//! and rotates any file that has grown past the size limit or whose interval
//! window has elapsed. Old rotated artifacts are pruned to a retention count.
//!
//! # Example
//!
//! ```no_run
//! use mik_logrotate::config::{default_settings, parse};
//! use mik_logrotate::inventory::StaticInventory;
//! use mik_logrotate::orchestrator::Orchestrator;
//! use mik_logrotate::rotation::SystemClock;
//! use mik_logrotate::supervisor::{NoopSupervisor, SupervisorLogs};
//! use std::collections::HashMap;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> mik_logrotate::error::Result<()> {
//! let mut raw = HashMap::new();
//! raw.insert("max_size".to_string(), "1M".to_string());
//! let policy = parse(&raw, &default_settings())?;
//!
//! let mut orchestrator = Orchestrator::new(
//!     policy,
//!     Arc::new(StaticInventory::default()),
//!     Arc::new(NoopSupervisor),
//!     SupervisorLogs::from_home(Path::new("/home/app/.pm2")),
//!     Arc::new(SystemClock),
//! );
//! let report = orchestrator.tick().await;
//! println!("rotated {} files", report.rotated.len());
//! # Ok(())
//! # }
//! ```

/// Centralized constants: setting keys, defaults and file names.
pub mod constants;

/// Rotation policy parsing and the watchdog configuration file.
///
/// - [`config::parse`] validates the flat host settings map
/// - [`config::WatchdogConfig`] loads `~/.mik/logrotate.toml`
pub mod config;

/// Error types shared by the library modules.
pub mod error;

/// Process inventory backends.
pub mod inventory;

/// Structured logging setup.
pub mod logging;

/// The per-tick rotation state machine.
pub mod orchestrator;

/// Naming, timing, rotation and pruning primitives.
pub mod rotation;

/// Supervisor control backends and the supervisor's own logs.
pub mod supervisor;

/// The periodic worker loop and shutdown handling.
pub mod worker;
