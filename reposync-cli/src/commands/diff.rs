//! `reposync diff` — show unified diffs for what sync would write.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use reposync_sync::diff;

use super::JobArgs;

/// Arguments for `reposync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Print the diff report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

impl DiffArgs {
    pub fn run(self) -> Result<ExitCode> {
        let job = self.job.into_job(true)?;
        let report = diff(&job.source, &job.destination, &job.options)
            .with_context(|| format!("diff failed for '{}'", job.source.display()))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(ExitCode::SUCCESS);
        }

        if report.is_empty() {
            println!("No differences for '{}'.", job.destination.display());
            return Ok(ExitCode::SUCCESS);
        }

        for file in &report.diffs {
            print!("{}", file.unified_diff);
            if !file.unified_diff.ends_with('\n') {
                println!();
            }
        }
        for orphan in &report.orphans {
            println!("Only in destination: {}", orphan.display());
        }

        Ok(ExitCode::SUCCESS)
    }
}
