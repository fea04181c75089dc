//! YAML job file describing one or more sync runs.
//!
//! # Format
//!
//! ```yaml
//! jobs:
//!   - source: templates/workflows
//!     destination: ../service-api/.github/workflows
//!     repo: service-api
//!     delete_orphaned: true
//!     exclude:
//!       - templates/workflows/local-only.yml
//!     layout: mirror          # flatten (default) | mirror
//!     on_error: fail-fast     # continue (default) | fail-fast
//! ```
//!
//! Relative `source` and `destination` paths are resolved against the
//! directory holding the job file. Exclusion entries are left untouched; they
//! are matched verbatim against source-joined paths.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::SyncOptions;

/// Default job file name looked up in the working directory.
pub const DEFAULT_JOB_FILE: &str = "reposync.yml";

/// One source → destination pair plus its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(flatten)]
    pub options: SyncOptions,
}

/// Root of a job file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SyncPlan {
    #[serde(default)]
    pub jobs: Vec<SyncJob>,
}

impl SyncPlan {
    /// Force dry-run on every job (CLI `--dry-run` wins over the file).
    pub fn force_dry_run(&mut self) {
        for job in &mut self.jobs {
            job.options.dry_run = true;
        }
    }
}

/// Load and validate the job file at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
/// path + line context) if malformed, `ConfigError::Invalid` if it has no jobs
/// or a job without a repository identifier.
pub fn load_plan_at(path: &Path) -> Result<SyncPlan, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut plan: SyncPlan = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    if plan.jobs.is_empty() {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: "no jobs defined".to_string(),
        });
    }

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for (index, job) in plan.jobs.iter_mut().enumerate() {
        if job.options.repo_id.as_str().trim().is_empty() {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: format!("job #{} has an empty repo identifier", index + 1),
            });
        }
        job.source = resolve(base, &job.source);
        job.destination = resolve(base, &job.destination);
    }

    tracing::debug!("loaded {} job(s) from {}", plan.jobs.len(), path.display());
    Ok(plan)
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
