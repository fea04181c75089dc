//! Error types for reposync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading a sync job file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The job file did not exist at the expected path.
    #[error("job file not found at {path}")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure while reading the job file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error — includes file path and line context from serde_yaml.
    #[error("failed to parse job file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file parsed but describes an unusable plan.
    #[error("invalid job file at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}
