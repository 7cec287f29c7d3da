//! Centralized constants for rotation defaults and fixed paths.
//!
//! All magic numbers used by the watchdog are defined here with
//! documented rationale.

// =============================================================================
// Rotation Setting Keys
// =============================================================================

/// Maximum file size before a size-triggered rotation.
pub const KEY_MAX_SIZE: &str = "max_size";

/// Calendar unit used by the time-based rotation clock.
pub const KEY_INTERVAL_UNIT: &str = "interval_unit";

/// Number of `interval_unit`s between forced rotations.
pub const KEY_INTERVAL: &str = "interval";

/// Number of rotated artifacts to keep, or `none`.
pub const KEY_RETAIN: &str = "retain";

/// Clock used for artifact names: `system` or `utc`.
pub const KEY_DATE_MODE: &str = "date_mode";

/// Date format appended to rotated artifact names.
pub const KEY_DATE_FORMAT: &str = "date_format";

/// Rotation strategy: `copytruncate` or `reload`.
pub const KEY_ROTATION_STRATEGY: &str = "rotation_strategy";

/// Every key understood by the rotation settings parser.
pub const KNOWN_KEYS: [&str; 7] = [
    KEY_MAX_SIZE,
    KEY_INTERVAL_UNIT,
    KEY_INTERVAL,
    KEY_RETAIN,
    KEY_DATE_MODE,
    KEY_DATE_FORMAT,
    KEY_ROTATION_STRATEGY,
];

// =============================================================================
// Rotation Defaults
// =============================================================================

/// Default size limit (10 MB).
pub const DEFAULT_MAX_SIZE: &str = "10MB";

/// Default interval unit. Daily rotation matches common logrotate setups.
pub const DEFAULT_INTERVAL_UNIT: &str = "day";

/// Default interval count.
pub const DEFAULT_INTERVAL: &str = "1";

/// Default retention: keep every rotated file.
pub const DEFAULT_RETAIN: &str = "none";

/// Default date mode (host local time).
pub const DEFAULT_DATE_MODE: &str = "system";

/// Default date format.
/// Fixed-width and zero-padded so artifact names sort chronologically.
pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD_HH-mm-ss";

/// Default rotation strategy.
/// Copy-truncate works even when the writer cannot reopen its handle.
pub const DEFAULT_ROTATION_STRATEGY: &str = "copytruncate";

/// Compiled-in default settings, keyed like the host settings map.
///
/// Every value here must parse; `config::parse` treats a bad default as fatal.
pub const DEFAULT_SETTINGS: [(&str, &str); 7] = [
    (KEY_MAX_SIZE, DEFAULT_MAX_SIZE),
    (KEY_INTERVAL_UNIT, DEFAULT_INTERVAL_UNIT),
    (KEY_INTERVAL, DEFAULT_INTERVAL),
    (KEY_RETAIN, DEFAULT_RETAIN),
    (KEY_DATE_MODE, DEFAULT_DATE_MODE),
    (KEY_DATE_FORMAT, DEFAULT_DATE_FORMAT),
    (KEY_ROTATION_STRATEGY, DEFAULT_ROTATION_STRATEGY),
];

// =============================================================================
// Worker
// =============================================================================

/// Default polling period in seconds.
/// Rationale: short enough to catch fast-growing logs, long enough to keep
/// stat traffic negligible.
pub const DEFAULT_WORKER_INTERVAL_SECS: u64 = 50;

// =============================================================================
// Paths
// =============================================================================

/// Rotated artifact separator between the original stem and the timestamp.
pub const ARTIFACT_SEPARATOR: &str = "__";

/// Rotated artifact extension.
pub const ARTIFACT_EXTENSION: &str = ".log";

/// Number of trailing characters stripped from a watched path to form its stem.
pub const STEM_SUFFIX_LEN: usize = 4;

/// Supervisor home directory name under the user's home.
pub const SUPERVISOR_DIR_NAME: &str = ".pm2";

/// Supervisor daemon log file name.
pub const SUPERVISOR_LOG_NAME: &str = "pm2.log";

/// Supervisor agent log file name.
pub const SUPERVISOR_AGENT_LOG_NAME: &str = "agent.log";

/// Watchdog configuration directory under the user's home.
pub const CONFIG_DIR_NAME: &str = ".mik";

/// Watchdog configuration file name.
pub const CONFIG_FILE_NAME: &str = "logrotate.toml";

/// Supervisor CLI binary used by the pm2 inventory and control backends.
pub const PM2_BINARY: &str = "pm2";
