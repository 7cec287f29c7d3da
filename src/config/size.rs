//! Human-readable size parsing (e.g. `10MB`, `1.5 GiB`, `512k`).
//!
//! Multipliers are binary: `1KB == 1024` bytes. A bare number is bytes.

/// Parses a human-readable size into a byte count.
///
/// Returns `None` for malformed input, unknown units, or values that do not
/// fit in a `u64`. Fractional byte counts are floored.
#[allow(clippy::cast_precision_loss)]
pub fn parse_size(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    if number.is_empty() {
        return None;
    }
    let value: f64 = number.parse().ok()?;
    let multiplier = unit_multiplier(unit.trim())?;

    let bytes = (value * multiplier as f64).floor();
    if !bytes.is_finite() || bytes < 0.0 || bytes >= u64::MAX as f64 {
        return None;
    }
    Some(bytes as u64)
}

fn unit_multiplier(unit: &str) -> Option<u64> {
    const KIB: u64 = 1024;
    let exponent = match unit.to_ascii_lowercase().as_str() {
        "" | "b" | "byte" | "bytes" => 0,
        "k" | "kb" | "kib" | "kilobyte" | "kilobytes" => 1,
        "m" | "mb" | "mib" | "megabyte" | "megabytes" => 2,
        "g" | "gb" | "gib" | "gigabyte" | "gigabytes" => 3,
        "t" | "tb" | "tib" | "terabyte" | "terabytes" => 4,
        "p" | "pb" | "pib" | "petabyte" | "petabytes" => 5,
        _ => return None,
    };
    Some(KIB.pow(exponent))
}
