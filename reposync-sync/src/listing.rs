//! Recursive listings and the removal primitive.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{io_err, SyncError};

/// Every non-directory entry under `root`, hidden ones included, as paths
/// relative to `root`. Symlinks are listed, not followed. A missing `root`
/// lists as empty.
///
/// Only names are collected; no file content is read.
pub fn list_files(root: &Path) -> Result<BTreeSet<PathBuf>, SyncError> {
    if !root.exists() {
        return Ok(BTreeSet::new());
    }

    let mut files = BTreeSet::new();
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            io_err(path, e.into())
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        files.insert(relative);
    }
    Ok(files)
}

/// Recursively delete `path`, file or directory. Removing a path that does
/// not exist is not an error.
pub fn remove(path: &Path) -> Result<(), SyncError> {
    tracing::debug!("RM: {}", path.display());

    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(delete_err(path, err)),
    };
    let result = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(delete_err(path, err)),
    }
}

fn delete_err(path: &Path, source: std::io::Error) -> SyncError {
    SyncError::DeleteFailed {
        path: path.to_path_buf(),
        source,
    }
}
