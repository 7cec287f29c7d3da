//! Rotation policy configuration.
//!
//! Host settings arrive as a flat string map. Each recognized key is parsed by
//! its own tagged parser; invalid host values are logged and replaced by the
//! compiled-in default, so callers always receive a fully populated policy.
//!
//! ## Module Structure
//!
//! - [`types`]: `RotationPolicy` and its enums
//! - [`size`]: human-readable size parsing
//! - [`parse`]: per-field parsers and the aggregating [`parse()`]
//! - [`file`]: the `logrotate.toml` loader

pub mod file;
mod parse;
mod size;
mod types;


pub use file::{ControlKind, InventorySource, WatchdogConfig};
pub use parse::{
    default_settings, parse, parse_date_format, parse_date_mode, parse_interval,
    parse_interval_unit, parse_max_size, parse_retain, parse_rotation_strategy,
};
pub use size::parse_size;
pub use types::{DateMode, IntervalUnit, RotationPolicy, RotationStrategy};
