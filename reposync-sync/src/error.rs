//! Error types for reposync-sync.

use std::path::PathBuf;

use thiserror::Error;

use reposync_renderer::RenderError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The sync source does not exist.
    #[error("sync source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// An error producing a file's content.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removing a path failed.
    #[error("failed to remove {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Whether this error came from an unusable companion values file.
    pub fn is_invalid_values(&self) -> bool {
        matches!(self, SyncError::Render(RenderError::ValuesFileInvalid { .. }))
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
