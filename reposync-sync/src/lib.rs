//! # reposync-sync
//!
//! Directory synchronizer for template repositories.
//!
//! Call [`sync`] to copy (and render) one template tree into one destination
//! checkout, optionally removing orphaned destination files, or
//! [`pipeline::run`] to process every job of a job file. [`diff`] previews
//! what a sync would change without touching the destination.

pub mod diff;
pub mod error;
pub mod listing;
pub mod orphans;
pub mod pipeline;
pub mod report;
pub mod synchronizer;
pub mod writer;

pub use diff::{diff, DiffReport, FileDiff};
pub use error::SyncError;
pub use listing::{list_files, remove};
pub use orphans::{find_orphans, Orphans};
pub use pipeline::PipelineError;
pub use report::{FileFailure, SyncReport};
pub use synchronizer::{sync, Synchronizer};
pub use writer::WriteResult;
