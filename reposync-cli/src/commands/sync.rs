//! `reposync sync` — copy and render template files into a destination.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use reposync_core::{load_plan_at, Diagnostics, RunDiagnostics, SyncPlan};
use reposync_sync::{pipeline, SyncReport, WriteResult};

use super::JobArgs;

/// Arguments for `reposync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Run every job of a YAML job file instead of a single job.
    #[arg(long, conflicts_with_all = ["source", "destination", "repo"])]
    pub config: Option<PathBuf>,

    /// Show what would be written or removed without touching any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the sync reports as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<ExitCode> {
        let plan = match &self.config {
            Some(path) => {
                let mut plan = load_plan_at(path)
                    .with_context(|| format!("could not load job file {}", path.display()))?;
                if self.dry_run {
                    plan.force_dry_run();
                }
                plan
            }
            None => SyncPlan {
                jobs: vec![self.job.into_job(self.dry_run)?],
            },
        };

        let diagnostics = RunDiagnostics::new();
        let reports = match pipeline::run(&plan, &diagnostics) {
            Ok(reports) => reports,
            Err(failure) => {
                print_reports(self.json, &failure.completed)?;
                return Err(anyhow::Error::new(failure.error).context("sync failed"));
            }
        };
        print_reports(self.json, &reports)?;

        if diagnostics.has_failed() || reports.iter().any(|r| !r.is_success()) {
            for message in diagnostics.failures() {
                eprintln!("{} {message}", "error:".red().bold());
            }
            return Ok(ExitCode::FAILURE);
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn print_reports(json: bool, reports: &[SyncReport]) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
    } else {
        for report in reports {
            print_report(report);
        }
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let mark = if report.is_success() {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };

    println!(
        "{prefix}{mark} {} → {} ({} written, {} unchanged, {} removed, {} failed)",
        report.source.display(),
        report.destination.display(),
        report.changed_count(),
        report.unchanged_count(),
        report.removed.len(),
        report.failures.len()
    );

    for write in &report.writes {
        match write {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }
    for path in &report.removed {
        println!("  {}  {}", "-".red(), path.display());
    }
    for path in &report.kept_orphans {
        println!("  {}  {} (excluded)", "=".yellow(), path.display());
    }
    for failure in &report.failures {
        println!("  {}  {}: {}", "!".red().bold(), failure.source.display(), failure.error);
    }
}
