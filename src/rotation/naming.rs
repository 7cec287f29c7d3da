//! Rotated artifact naming.
//!
//! An artifact for `/var/log/app.log` is `/var/log/app__<timestamp>.log`:
//! the watched path with its last four characters removed, then `__`, the
//! formatted timestamp and `.log`. Pruning finds siblings by the same
//! `<stem>__` prefix, so both sides must derive it here.

use std::path::{Path, PathBuf};

use crate::constants::{ARTIFACT_EXTENSION, ARTIFACT_SEPARATOR, STEM_SUFFIX_LEN};
use crate::error::{Error, Result};

/// Returns the watched path with its last four characters removed.
///
/// Paths shorter than four characters yield an empty stem.
pub fn stem(path: &Path) -> Result<&str> {
    let text = path
        .to_str()
        .ok_or_else(|| Error::NonUtf8Path(path.display().to_string()))?;
    let cut = text
        .char_indices()
        .rev()
        .nth(STEM_SUFFIX_LEN - 1)
        .map_or(0, |(idx, _)| idx);
    Ok(&text[..cut])
}

/// Returns `<stem>__`, the prefix every rotated sibling of `path` starts with.
pub fn artifact_prefix(path: &Path) -> Result<String> {
    Ok(format!("{}{ARTIFACT_SEPARATOR}", stem(path)?))
}

/// Builds the rotated artifact path for `path` stamped with `timestamp`.
pub fn artifact_path(path: &Path, timestamp: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(format!(
        "{}{timestamp}{ARTIFACT_EXTENSION}",
        artifact_prefix(path)?
    )))
}
