//! Domain types shared by the renderer, the synchronizer and the CLI.
//!
//! All path fields use `PathBuf`; exclusion entries stay `String` because
//! membership is an exact string match against joined paths.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of the target repository. Selects the companion values file
/// (`<template>.<repo>.values.yml`) for each template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoId(pub String);

impl RepoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Paths that must never be copied, and never deleted as orphans.
///
/// Entries are compared verbatim with the source-joined path of a listing
/// entry (and, during the copy phase, with the relative entry path too).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet(BTreeSet<String>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.contains(entry)
    }

    /// Membership test for a filesystem path, using its lossy string form.
    pub fn contains_path(&self, path: &Path) -> bool {
        self.0.contains(path.to_string_lossy().as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a source entry's relative path maps into the destination directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Every file lands directly in the destination under its base name;
    /// nested source directories collapse into one level.
    #[default]
    Flatten,
    /// The destination mirrors the source's relative paths.
    Mirror,
}

impl Layout {
    /// Destination path of `relative`, relative to the destination root.
    pub fn map(&self, relative: &Path) -> PathBuf {
        match self {
            Layout::Flatten => relative
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| relative.to_path_buf()),
            Layout::Mirror => relative.to_path_buf(),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Flatten => write!(f, "flatten"),
            Layout::Mirror => write!(f, "mirror"),
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flatten" => Ok(Layout::Flatten),
            "mirror" => Ok(Layout::Mirror),
            other => Err(format!("unknown layout '{other}'; expected: flatten, mirror")),
        }
    }
}

/// What the copy phase does when a single file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure in the report and carry on with the next file.
    #[default]
    Continue,
    /// Stop at the first failed file and return its error.
    FailFast,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Everything a single `sync` call needs besides the two paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    #[serde(alias = "repo")]
    pub repo_id: RepoId,
    #[serde(default)]
    pub delete_orphaned: bool,
    #[serde(default)]
    pub exclude: ExclusionSet,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub on_error: FailurePolicy,
    #[serde(default)]
    pub dry_run: bool,
}

impl SyncOptions {
    /// Options with every flag at its default: no orphan deletion, nothing
    /// excluded, flattened layout, continue on error, real writes.
    pub fn new(repo_id: impl Into<RepoId>) -> Self {
        SyncOptions {
            repo_id: repo_id.into(),
            delete_orphaned: false,
            exclude: ExclusionSet::new(),
            layout: Layout::default(),
            on_error: FailurePolicy::default(),
            dry_run: false,
        }
    }

    pub fn delete_orphaned(mut self, enabled: bool) -> Self {
        self.delete_orphaned = enabled;
        self
    }

    pub fn exclude(mut self, exclude: ExclusionSet) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn on_error(mut self, policy: FailurePolicy) -> Self {
        self.on_error = policy;
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
