//! Type definitions for the rotation policy.

use serde::Serialize;
use std::fmt;

/// Calendar unit used to measure rotation intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Second,
    Minute,
    Hour,
    Day,
    /// Weeks start on Monday.
    Week,
    Month,
    Quarter,
    Year,
}

impl IntervalUnit {
    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which clock is used when stamping rotated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    /// Host local time.
    #[default]
    System,
    Utc,
}

impl fmt::Display for DateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::Utc => f.write_str("utc"),
        }
    }
}

/// How a file is moved aside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    /// Rename the file; the writer must reopen its handle afterwards.
    AtomicRename,
    /// Copy the content aside, then truncate in place.
    #[default]
    CopyTruncate,
}

impl fmt::Display for RotationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtomicRename => f.write_str("reload"),
            Self::CopyTruncate => f.write_str("copytruncate"),
        }
    }
}

/// Validated rotation policy.
///
/// Produced only by [`super::parse`], so every field holds a value that
/// passed its parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationPolicy {
    /// Size in bytes at or above which a file is rotated.
    pub max_size_bytes: u64,
    pub interval_unit: IntervalUnit,
    /// Number of `interval_unit`s between forced rotations (at least 1).
    pub interval_count: u32,
    /// Rotated artifacts to keep per file; `None` keeps everything.
    pub retain_count: Option<usize>,
    pub date_mode: DateMode,
    /// Moment-style date format appended to artifact names.
    pub date_format: String,
    pub rotation_strategy: RotationStrategy,
}

impl RotationPolicy {
    /// Logs the effective policy, one field per structured key.
    pub fn log_effective(&self) {
        tracing::info!(
            max_size_bytes = self.max_size_bytes,
            interval_unit = %self.interval_unit,
            interval = self.interval_count,
            retain = ?self.retain_count,
            date_mode = %self.date_mode,
            date_format = %self.date_format,
            rotation_strategy = %self.rotation_strategy,
            "Effective rotation policy"
        );
    }
}
