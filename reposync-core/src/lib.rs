//! reposync core library — shared domain types, diagnostics, job files.
//!
//! - [`types`] — newtypes, layout/failure enums and [`SyncOptions`]
//! - [`diagnostics`] — the [`Diagnostics`] sink injected into each run
//! - [`config`] — YAML job file loading
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod types;

pub use config::{load_plan_at, SyncJob, SyncPlan};
pub use diagnostics::{Diagnostics, RunDiagnostics};
pub use error::ConfigError;
pub use types::{ExclusionSet, FailurePolicy, Layout, RepoId, SyncOptions};
