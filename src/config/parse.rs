//! Per-field setting parsers and the aggregating policy parser.
//!
//! Each field parser is a pure `&str -> Result<T>`. The aggregate parser
//! applies it first to the compiled-in default, then to the host value; a bad
//! host value is logged and the default kept.

use std::collections::HashMap;

use super::size::parse_size;
use super::types::{DateMode, IntervalUnit, RotationPolicy, RotationStrategy};
use crate::constants::{
    DEFAULT_SETTINGS, KEY_DATE_FORMAT, KEY_DATE_MODE, KEY_INTERVAL, KEY_INTERVAL_UNIT,
    KEY_MAX_SIZE, KEY_RETAIN, KEY_ROTATION_STRATEGY, KNOWN_KEYS,
};
use crate::error::{Error, Result};

/// Returns the compiled-in default settings as an owned map.
pub fn default_settings() -> HashMap<String, String> {
    DEFAULT_SETTINGS
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Parses host settings into a validated [`RotationPolicy`].
///
/// Never fails on host input. The only error is an invalid or missing
/// compiled-in default, which is a programming error the caller should treat
/// as fatal.
pub fn parse(
    raw: &HashMap<String, String>,
    defaults: &HashMap<String, String>,
) -> Result<RotationPolicy> {
    for key in raw.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Ignoring unknown rotation setting");
        }
    }

    Ok(RotationPolicy {
        max_size_bytes: resolve(KEY_MAX_SIZE, raw, defaults, parse_max_size)?,
        interval_unit: resolve(KEY_INTERVAL_UNIT, raw, defaults, parse_interval_unit)?,
        interval_count: resolve(KEY_INTERVAL, raw, defaults, parse_interval)?,
        retain_count: resolve(KEY_RETAIN, raw, defaults, parse_retain)?,
        date_mode: resolve(KEY_DATE_MODE, raw, defaults, parse_date_mode)?,
        date_format: resolve(KEY_DATE_FORMAT, raw, defaults, parse_date_format)?,
        rotation_strategy: resolve(
            KEY_ROTATION_STRATEGY,
            raw,
            defaults,
            parse_rotation_strategy,
        )?,
    })
}

fn resolve<T>(
    key: &str,
    raw: &HashMap<String, String>,
    defaults: &HashMap<String, String>,
    parser: fn(&str) -> Result<T>,
) -> Result<T> {
    let default_raw = defaults.get(key).map_or("", String::as_str);
    let value = parser(default_raw).map_err(|e| Error::InvalidDefault {
        key: key.to_string(),
        source: Box::new(e),
    })?;

    let Some(input) = raw.get(key) else {
        return Ok(value);
    };

    match parser(input) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            tracing::error!(
                key = %key,
                value = %input,
                default = %default_raw,
                error = %e,
                "Invalid rotation setting, using default"
            );
            Ok(value)
        },
    }
}

/// Parses `max_size`: a positive human-readable size.
pub fn parse_max_size(raw: &str) -> Result<u64> {
    match parse_size(raw) {
        Some(bytes) if bytes > 0 => Ok(bytes),
        Some(_) => Err(Error::config_value(KEY_MAX_SIZE, raw, "must be positive")),
        None => Err(Error::config_value(KEY_MAX_SIZE, raw, "not a size")),
    }
}

/// Parses `interval_unit`, accepting the usual calendar-unit aliases.
///
/// Single letters are case-sensitive (`M` is month, `m` is minute); longer
/// names are not.
pub fn parse_interval_unit(raw: &str) -> Result<IntervalUnit> {
    let trimmed = raw.trim();
    let exact = match trimmed {
        "M" => Some(IntervalUnit::Month),
        "m" => Some(IntervalUnit::Minute),
        "D" => Some(IntervalUnit::Day),
        "Q" => Some(IntervalUnit::Quarter),
        _ => None,
    };
    if let Some(unit) = exact {
        return Ok(unit);
    }

    let unit = match trimmed.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => IntervalUnit::Second,
        "min" | "mins" | "minute" | "minutes" => IntervalUnit::Minute,
        "h" | "hr" | "hrs" | "hour" | "hours" => IntervalUnit::Hour,
        "d" | "day" | "days" | "date" | "dates" => IntervalUnit::Day,
        "w" | "week" | "weeks" | "isoweek" | "isoweeks" => IntervalUnit::Week,
        "month" | "months" => IntervalUnit::Month,
        "q" | "quarter" | "quarters" => IntervalUnit::Quarter,
        "y" | "year" | "years" => IntervalUnit::Year,
        _ => {
            return Err(Error::config_value(
                KEY_INTERVAL_UNIT,
                raw,
                "unknown calendar unit",
            ));
        },
    };
    Ok(unit)
}

/// Parses `interval`: a positive integer.
pub fn parse_interval(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(Error::config_value(KEY_INTERVAL, raw, "must be positive")),
        Err(_) => Err(Error::config_value(KEY_INTERVAL, raw, "not an integer")),
    }
}

/// Parses `retain`: `none` for unlimited, otherwise a non-negative integer.
pub fn parse_retain(raw: &str) -> Result<Option<usize>> {
    let trimmed = raw.trim();
    if trimmed == "none" {
        return Ok(None);
    }
    trimmed
        .parse::<usize>()
        .map(Some)
        .map_err(|_| Error::config_value(KEY_RETAIN, raw, "expected 'none' or a count"))
}

/// Parses `date_mode`: exactly `system` or `utc`.
pub fn parse_date_mode(raw: &str) -> Result<DateMode> {
    match raw {
        "system" => Ok(DateMode::System),
        "utc" => Ok(DateMode::Utc),
        _ => Err(Error::config_value(
            KEY_DATE_MODE,
            raw,
            "expected 'system' or 'utc'",
        )),
    }
}

/// Parses `date_format`: any non-empty string.
pub fn parse_date_format(raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(Error::config_value(KEY_DATE_FORMAT, raw, "must not be empty"));
    }
    Ok(raw.to_string())
}

/// Parses `rotation_strategy`: `copytruncate` or `reload`.
pub fn parse_rotation_strategy(raw: &str) -> Result<RotationStrategy> {
    match raw {
        "copytruncate" => Ok(RotationStrategy::CopyTruncate),
        "reload" => Ok(RotationStrategy::AtomicRename),
        _ => Err(Error::config_value(
            KEY_ROTATION_STRATEGY,
            raw,
            "expected 'copytruncate' or 'reload'",
        )),
    }
}
