//! Directory synchronizer: copy phase plus optional orphan reconciliation.
//!
//! Copies run strictly one after another. Every copy has finished (or failed
//! and been recorded) before [`Synchronizer::sync`] returns; there is no
//! background work left behind.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;

use reposync_core::{Diagnostics, FailurePolicy, SyncOptions};
use reposync_renderer::{is_values_file, Renderer};

use crate::diff::{diff_with, DiffReport};
use crate::error::{io_err, SyncError};
use crate::listing::list_files;
use crate::orphans;
use crate::report::{FileFailure, SyncReport};
use crate::writer::write_file;

// ---------------------------------------------------------------------------
// Copy plan
// ---------------------------------------------------------------------------

/// One source file and where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// What the copy phase will do, computed from listings only.
#[derive(Debug, Default)]
pub(crate) struct CopyPlan {
    pub is_dir: bool,
    pub copies: Vec<PlannedCopy>,
    pub excluded: Vec<PathBuf>,
    pub values_files: Vec<PathBuf>,
    /// Copies whose destination an earlier copy in the plan already targets.
    pub collisions: Vec<PlannedCopy>,
}

pub(crate) fn plan_copies(
    source: &Path,
    destination: &Path,
    options: &SyncOptions,
) -> Result<CopyPlan, SyncError> {
    let meta = match std::fs::symlink_metadata(source) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(SyncError::SourceNotFound {
                path: source.to_path_buf(),
            })
        }
        Err(err) => return Err(io_err(source, err)),
    };

    if !meta.is_dir() {
        return Ok(CopyPlan {
            is_dir: false,
            copies: vec![PlannedCopy {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
            }],
            ..CopyPlan::default()
        });
    }

    let mut plan = CopyPlan {
        is_dir: true,
        ..CopyPlan::default()
    };
    let mut targets: HashSet<PathBuf> = HashSet::new();
    for relative in list_files(source)? {
        let source_path = source.join(&relative);
        if options.exclude.contains_path(&source_path) || options.exclude.contains_path(&relative) {
            plan.excluded.push(source_path);
            continue;
        }
        if is_values_file(&relative) {
            plan.values_files.push(source_path);
            continue;
        }

        let copy = PlannedCopy {
            source: source_path,
            destination: destination.join(options.layout.map(&relative)),
        };
        if !targets.insert(copy.destination.clone()) {
            plan.collisions.push(copy.clone());
        }
        plan.copies.push(copy);
    }
    Ok(plan)
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Sync `source` into `destination` with the standard renderer.
///
/// See [`Synchronizer::sync`].
pub fn sync(
    source: &Path,
    destination: &Path,
    options: &SyncOptions,
    diagnostics: &dyn Diagnostics,
) -> Result<SyncReport, SyncError> {
    Synchronizer::new().sync(source, destination, options, diagnostics)
}

/// Copies a template tree into a destination checkout.
#[derive(Default)]
pub struct Synchronizer {
    renderer: Renderer,
}

impl Synchronizer {
    pub fn new() -> Self {
        Synchronizer {
            renderer: Renderer::new(),
        }
    }

    /// Use a renderer with a custom detector or engine.
    pub fn with_renderer(renderer: Renderer) -> Self {
        Synchronizer { renderer }
    }

    /// Copy every eligible file from `source` to `destination`, then remove
    /// orphans if `options.delete_orphaned` is set.
    ///
    /// A file `source` is copied to the literal `destination` path. A
    /// directory `source` is listed recursively; excluded entries and
    /// `*.values.yml` files are skipped, the rest are rendered into
    /// `destination` according to `options.layout`.
    ///
    /// Per-file failures follow `options.on_error`: recorded in the report
    /// (`Continue`) or returned at once (`FailFast`). Either way the run is
    /// marked failed through `diagnostics`. A missing source and a failed
    /// orphan removal are always returned as errors.
    pub fn sync(
        &self,
        source: &Path,
        destination: &Path,
        options: &SyncOptions,
        diagnostics: &dyn Diagnostics,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::new(
            source.to_path_buf(),
            destination.to_path_buf(),
            options.repo_id.clone(),
            options.dry_run,
        );

        let plan = match plan_copies(source, destination, options) {
            Ok(plan) => plan,
            Err(err) => {
                diagnostics.error(&err.to_string());
                diagnostics.set_failed(&err.to_string());
                return Err(err);
            }
        };

        for path in &plan.excluded {
            diagnostics.debug(&format!("Excluding file {}", path.display()));
        }
        for path in &plan.values_files {
            diagnostics.debug(&format!("Skipping values file {}", path.display()));
        }
        for copy in &plan.collisions {
            diagnostics.warn(&format!(
                "{} overwrites {}, already targeted by another source file",
                copy.source.display(),
                copy.destination.display()
            ));
        }
        report.excluded = plan.excluded;

        for copy in &plan.copies {
            self.copy_one(copy, options, diagnostics, &mut report)?;
        }

        if options.delete_orphaned {
            if plan.is_dir {
                orphans::reconcile(source, destination, options, diagnostics, &mut report)?;
            } else {
                diagnostics.debug(&format!(
                    "{} is a single file; skipping orphan reconciliation",
                    source.display()
                ));
            }
        }

        report.finished_at = Utc::now();
        diagnostics.info(&format!(
            "synced {} to {}: {} changed, {} unchanged, {} removed, {} failed",
            source.display(),
            destination.display(),
            report.changed_count(),
            report.unchanged_count(),
            report.removed.len(),
            report.failures.len()
        ));
        Ok(report)
    }

    /// Preview what [`Synchronizer::sync`] would change, rendering with this
    /// synchronizer's renderer. Writes nothing.
    pub fn diff(
        &self,
        source: &Path,
        destination: &Path,
        options: &SyncOptions,
    ) -> Result<DiffReport, SyncError> {
        diff_with(&self.renderer, source, destination, options)
    }

    fn copy_one(
        &self,
        copy: &PlannedCopy,
        options: &SyncOptions,
        diagnostics: &dyn Diagnostics,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        diagnostics.info(&format!(
            "CP: {} TO {}",
            copy.source.display(),
            copy.destination.display()
        ));

        let outcome = self
            .renderer
            .render_file(&copy.source, &options.repo_id)
            .map_err(SyncError::from)
            .and_then(|rendered| write_file(&copy.destination, &rendered.content, options.dry_run));

        match outcome {
            Ok(write) => {
                report.writes.push(write);
                Ok(())
            }
            Err(err) => {
                let message = format!("failed to copy {}: {err}", copy.source.display());
                diagnostics.error(&message);
                diagnostics.set_failed(&message);
                match options.on_error {
                    FailurePolicy::FailFast => Err(err),
                    FailurePolicy::Continue => {
                        report.failures.push(FileFailure {
                            source: copy.source.clone(),
                            destination: copy.destination.clone(),
                            error: err,
                        });
                        Ok(())
                    }
                }
            }
        }
    }
}
