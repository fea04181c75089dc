//! Dry-run unified diff support for `reposync diff`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::TextDiff;

use reposync_core::SyncOptions;
use reposync_renderer::Renderer;

use crate::{error::io_err, orphans::find_orphans, synchronizer::plan_copies, SyncError};

/// A single rendered file diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub unified_diff: String,
}

/// What a sync with the same options would change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub diffs: Vec<FileDiff>,
    /// Destination files a sync would remove (only with `delete_orphaned`).
    pub orphans: Vec<PathBuf>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty() && self.orphans.is_empty()
    }
}

/// Render what `sync` would write and compare it with current on-disk content.
///
/// No files are written. The first render failure is returned. Uses the
/// standard renderer; see [`Synchronizer::diff`](crate::Synchronizer::diff)
/// for a custom one.
pub fn diff(
    source: &Path,
    destination: &Path,
    options: &SyncOptions,
) -> Result<DiffReport, SyncError> {
    diff_with(&Renderer::new(), source, destination, options)
}

pub(crate) fn diff_with(
    renderer: &Renderer,
    source: &Path,
    destination: &Path,
    options: &SyncOptions,
) -> Result<DiffReport, SyncError> {
    let plan = plan_copies(source, destination, options)?;

    // A single-file destination is itself the root for header purposes.
    let header_root = if plan.is_dir {
        destination
    } else {
        destination.parent().unwrap_or(destination)
    };

    let mut diffs = Vec::new();
    for copy in &plan.copies {
        let rendered = renderer.render_file(&copy.source, &options.repo_id)?;
        let existing = read_existing_or_empty(&copy.destination)?;
        if existing == rendered.content {
            continue;
        }

        let old = String::from_utf8_lossy(&existing);
        let new = String::from_utf8_lossy(&rendered.content);
        let relative = copy
            .destination
            .strip_prefix(header_root)
            .unwrap_or(copy.destination.as_path());
        let old_header = format!("a/{}", relative.display());
        let new_header = format!("b/{}", relative.display());
        let unified = TextDiff::from_lines(old.as_ref(), new.as_ref())
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            source: copy.source.clone(),
            destination: copy.destination.clone(),
            unified_diff: unified,
        });
    }

    let orphans = if options.delete_orphaned && plan.is_dir {
        find_orphans(source, destination, options)?.removable
    } else {
        Vec::new()
    };

    Ok(DiffReport { diffs, orphans })
}

fn read_existing_or_empty(path: &Path) -> Result<Vec<u8>, SyncError> {
    match std::fs::read(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(io_err(path, err)),
    }
}
