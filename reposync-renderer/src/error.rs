//! Error types for reposync-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by a [`TemplateEngine`](crate::TemplateEngine).
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// All errors that can arise while producing a file's destination content.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Filesystem error while reading a source or values file.
    #[error("render io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The companion values file exists but holds no usable mapping.
    #[error("template values not found in {path}: {reason}")]
    ValuesFileInvalid { path: PathBuf, reason: String },

    /// The template engine rejected or failed to render the file.
    #[error("template engine error in {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: EngineError,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
