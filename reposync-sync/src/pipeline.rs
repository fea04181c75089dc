//! Shared entrypoint for running every job of a job file.

use reposync_core::{Diagnostics, SyncPlan};

use crate::{SyncError, SyncReport, Synchronizer};

/// A job failed fatally. Carries the reports of the jobs that ran before it.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct PipelineError {
    pub completed: Vec<SyncReport>,
    #[source]
    pub error: SyncError,
}

/// Run each job of `plan` in order with one shared [`Synchronizer`].
///
/// Stops at the first fatal job error (missing source, failed removal, or a
/// per-file failure under `fail-fast`). The reports of jobs that already ran
/// come back in [`PipelineError::completed`].
pub fn run(plan: &SyncPlan, diagnostics: &dyn Diagnostics) -> Result<Vec<SyncReport>, PipelineError> {
    let synchronizer = Synchronizer::new();
    let mut reports = Vec::with_capacity(plan.jobs.len());
    for job in &plan.jobs {
        diagnostics.info(&format!(
            "job: {} -> {} (repo {})",
            job.source.display(),
            job.destination.display(),
            job.options.repo_id
        ));
        match synchronizer.sync(&job.source, &job.destination, &job.options, diagnostics) {
            Ok(report) => reports.push(report),
            Err(error) => {
                return Err(PipelineError {
                    completed: reports,
                    error,
                })
            }
        }
    }
    Ok(reports)
}
