//! Retention pruning of rotated artifacts.
//!
//! Siblings of a watched file are the entries in its directory whose full path
//! starts with `<stem>__`. They are sorted in descending byte order, which is
//! newest-first as long as the date format is fixed-width and zero-padded.
//! The first `retain` are kept; the rest are deleted one by one, and a failed
//! deletion never stops the others.
//!
//! The prefix match is the only link between a file and its artifacts, so
//! `app.log` and `app.err` share siblings, and any unrelated file starting with
//! `app__` is treated as an artifact.

use std::path::{Path, PathBuf};
use tokio::fs;

use super::naming::artifact_prefix;
use crate::error::{Error, Result};

/// Outcome of one pruning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Artifacts left in place, newest first.
    pub kept: Vec<PathBuf>,
    /// Artifacts removed.
    pub deleted: Vec<PathBuf>,
    /// Artifacts whose removal failed.
    pub failed: Vec<PathBuf>,
}

/// Lists rotated siblings of `path`, newest first.
pub async fn list_artifacts(path: &Path) -> Result<Vec<PathBuf>> {
    let prefix = artifact_prefix(path)?;
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = parent.unwrap_or_else(|| Path::new("."));

    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| Error::io(format!("list {}", dir.display()), e))?;

    let mut siblings = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => return Err(Error::io(format!("list {}", dir.display()), e)),
        };
        let name = entry.file_name();
        let candidate = match parent {
            Some(p) => p.join(&name),
            None => PathBuf::from(&name),
        };
        if candidate
            .to_str()
            .is_some_and(|text| text.starts_with(&prefix))
        {
            siblings.push(candidate);
        }
    }

    siblings.sort_unstable_by(|a, b| b.as_os_str().cmp(a.as_os_str()));
    Ok(siblings)
}

/// Deletes all but the `retain` newest rotated siblings of `path`.
///
/// Only listing failures are returned as errors; individual deletion
/// failures are logged and reported in [`PruneReport::failed`].
pub async fn prune(path: &Path, retain: usize) -> Result<PruneReport> {
    let mut siblings = list_artifacts(path).await?;
    let doomed = siblings.split_off(retain.min(siblings.len()));

    let mut report = PruneReport {
        kept: siblings,
        ..PruneReport::default()
    };

    for artifact in doomed {
        match fs::remove_file(&artifact).await {
            Ok(()) => {
                tracing::info!(path = %artifact.display(), "Deleted old rotated log");
                report.deleted.push(artifact);
            },
            Err(e) => {
                tracing::warn!(
                    path = %artifact.display(),
                    error = %e,
                    "Failed to delete old rotated log"
                );
                report.failed.push(artifact);
            },
        }
    }

    Ok(report)
}
