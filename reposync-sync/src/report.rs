//! Per-call sync summary.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use reposync_core::RepoId;

use crate::error::SyncError;
use crate::writer::WriteResult;

/// A single file that could not be copied.
#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(serialize_with = "serialize_display")]
    pub error: SyncError,
}

/// Everything one `sync` call did, or would have done in dry-run mode.
#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub repo_id: RepoId,
    pub dry_run: bool,
    pub writes: Vec<WriteResult>,
    /// Source paths skipped because they matched the exclusion set.
    pub excluded: Vec<PathBuf>,
    /// Orphans removed (or, in dry-run, that would be removed).
    pub removed: Vec<PathBuf>,
    /// Orphans left in place because their source-joined path is excluded.
    pub kept_orphans: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub(crate) fn new(
        source: PathBuf,
        destination: PathBuf,
        repo_id: RepoId,
        dry_run: bool,
    ) -> Self {
        let now = Utc::now();
        SyncReport {
            source,
            destination,
            repo_id,
            dry_run,
            writes: Vec::new(),
            excluded: Vec::new(),
            removed: Vec::new(),
            kept_orphans: Vec::new(),
            failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// True when every eligible file was copied.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Files written, or that would be written in dry-run mode.
    pub fn changed_count(&self) -> usize {
        self.writes
            .iter()
            .filter(|w| !matches!(w, WriteResult::Unchanged { .. }))
            .count()
    }

    pub fn unchanged_count(&self) -> usize {
        self.writes.len() - self.changed_count()
    }
}

fn serialize_display<S: Serializer>(error: &SyncError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
