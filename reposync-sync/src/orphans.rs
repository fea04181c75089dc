//! Orphan reconciliation.
//!
//! A destination file is an orphan when no eligible source entry accounts for
//! it, neither by its relative path nor by where the layout puts it.
//! Companion values files never account for anything, so stray
//! `*.values.yml` files in the destination are orphans too.
//!
//! Exclusions are checked against the *source*-joined path of the orphan,
//! even though the file being kept lives in the destination.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use reposync_core::{Diagnostics, SyncOptions};
use reposync_renderer::is_values_file;

use crate::error::SyncError;
use crate::listing::{list_files, remove};
use crate::report::SyncReport;

/// Orphans found in a destination, split by whether they may be removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Orphans {
    /// Destination paths to remove.
    pub removable: Vec<PathBuf>,
    /// Destination paths kept because their source-joined path is excluded.
    pub excluded: Vec<PathBuf>,
}

/// Compare fresh listings of `source` and `destination`. Nothing is removed.
pub fn find_orphans(
    source: &Path,
    destination: &Path,
    options: &SyncOptions,
) -> Result<Orphans, SyncError> {
    let source_entries = list_files(source)?;
    let destination_entries = list_files(destination)?;

    let accounted: BTreeSet<PathBuf> = source_entries
        .iter()
        .filter(|relative| !is_values_file(relative))
        .flat_map(|relative| [relative.clone(), options.layout.map(relative)])
        .collect();

    let mut orphans = Orphans::default();
    for relative in destination_entries {
        if accounted.contains(&relative) {
            continue;
        }
        let file_path = destination.join(&relative);
        if options.exclude.contains_path(&source.join(&relative)) {
            orphans.excluded.push(file_path);
        } else {
            orphans.removable.push(file_path);
        }
    }
    Ok(orphans)
}

/// Remove every removable orphan, one at a time. The first failed removal
/// aborts reconciliation and is returned.
pub(crate) fn reconcile(
    source: &Path,
    destination: &Path,
    options: &SyncOptions,
    diagnostics: &dyn Diagnostics,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    let orphans = find_orphans(source, destination, options)?;

    for path in orphans.excluded {
        diagnostics.debug(&format!(
            "Found an orphaned file in the target repo - {}; excluded, keeping it",
            path.display()
        ));
        report.kept_orphans.push(path);
    }

    for path in orphans.removable {
        diagnostics.debug(&format!(
            "Found an orphaned file in the target repo - {}",
            path.display()
        ));
        if options.dry_run {
            diagnostics.info(&format!("[dry-run] would remove {}", path.display()));
            report.removed.push(path);
            continue;
        }

        diagnostics.info(&format!("Removing file {}", path.display()));
        if let Err(err) = remove(&path) {
            diagnostics.error(&err.to_string());
            diagnostics.set_failed(&err.to_string());
            return Err(err);
        }
        report.removed.push(path);
    }
    Ok(())
}
