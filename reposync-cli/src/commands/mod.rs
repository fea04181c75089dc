pub mod diff;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use reposync_core::{ExclusionSet, FailurePolicy, Layout, SyncJob, SyncOptions};

/// Source, destination and options of a single sync job given on the
/// command line.
#[derive(Args, Debug)]
pub struct JobArgs {
    /// Template file or directory to copy from.
    pub source: Option<PathBuf>,

    /// Destination directory (or file, when the source is a file).
    pub destination: Option<PathBuf>,

    /// Repository identifier; selects `<file>.<repo>.values.yml`.
    #[arg(long)]
    pub repo: Option<String>,

    /// Remove destination files that no longer exist in the source.
    #[arg(long)]
    pub delete_orphaned: bool,

    /// Source path to skip, and never delete as an orphan. Repeatable.
    #[arg(long = "exclude", value_name = "PATH")]
    pub exclude: Vec<String>,

    /// How nested source paths map into the destination.
    #[arg(long, default_value_t = Layout::Flatten)]
    pub layout: Layout,

    /// Stop at the first file that fails to copy.
    #[arg(long)]
    pub fail_fast: bool,
}

impl JobArgs {
    pub fn into_job(self, dry_run: bool) -> Result<SyncJob> {
        let source = self.source.context("provide a SOURCE path or use --config")?;
        let destination = self
            .destination
            .context("provide a DESTINATION path")?;
        let repo = self.repo.context("provide --repo <ID>")?;

        let on_error = if self.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Continue
        };
        let options = SyncOptions::new(repo)
            .delete_orphaned(self.delete_orphaned)
            .exclude(self.exclude.into_iter().collect::<ExclusionSet>())
            .layout(self.layout)
            .on_error(on_error)
            .dry_run(dry_run);

        Ok(SyncJob {
            source,
            destination,
            options,
        })
    }
}
