//! Rotation decision and execution engine.
//!
//! ## Module Structure
//!
//! - [`naming`]: artifact stem and name derivation
//! - [`date_format`]: moment-style timestamp rendering
//! - [`time`]: time sources and date-mode conversions
//! - [`clock`]: interval windows for forced rotation
//! - [`rotator`]: rename or copy-truncate of one file
//! - [`pruner`]: retention of rotated artifacts

pub mod clock;
pub mod date_format;
pub mod naming;
pub mod pruner;
pub mod rotator;
pub mod time;


pub use clock::RotationClock;
pub use pruner::{PruneReport, list_artifacts, prune};
pub use rotator::{RotationReason, rotate};
pub use time::{ManualClock, SystemClock, TimeSource};
