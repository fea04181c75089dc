//! Companion values files.
//!
//! A template `path/to/file` rendered for repository `svc` reads its values
//! from `path/to/file.svc.values.yml`. Values are loaded fresh on every render.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use reposync_core::RepoId;

use crate::error::{io_err, RenderError};

/// File name suffix shared by every companion values file.
pub const VALUES_SUFFIX: &str = ".values.yml";

/// Key → value mapping handed to the template engine.
pub type TemplateValues = serde_yaml::Mapping;

/// `<source>.<repo>.values.yml` — pure, no I/O.
pub fn values_path(source: &Path, repo: &RepoId) -> PathBuf {
    let mut raw: OsString = source.as_os_str().to_os_string();
    raw.push(format!(".{repo}{VALUES_SUFFIX}"));
    PathBuf::from(raw)
}

/// True for any file named `*.values.yml`, whatever repository it targets.
pub fn is_values_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(VALUES_SUFFIX))
        .unwrap_or(false)
}

/// Values for `source` rendered for `repo`.
///
/// Returns an empty mapping (and `None`) when no values file exists, and
/// `RenderError::ValuesFileInvalid` when one exists but is empty, null,
/// malformed or not a mapping.
pub fn load_values(
    source: &Path,
    repo: &RepoId,
) -> Result<(TemplateValues, Option<PathBuf>), RenderError> {
    let path = values_path(source, repo);
    if !path.exists() {
        tracing::info!("templated values file {} doesn't exist", path.display());
        return Ok((TemplateValues::new(), None));
    }
    tracing::info!("templated values file {} exists", path.display());

    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let values = parse_values(&path, &contents)?;
    Ok((values, Some(path)))
}

fn parse_values(path: &Path, contents: &str) -> Result<TemplateValues, RenderError> {
    let invalid = |reason: String| RenderError::ValuesFileInvalid {
        path: path.to_path_buf(),
        reason,
    };

    if contents.trim().is_empty() {
        return Err(invalid("document is empty".to_string()));
    }
    let document: Value = serde_yaml::from_str(contents).map_err(|e| invalid(e.to_string()))?;
    match document {
        Value::Mapping(mapping) if mapping.is_empty() => Err(invalid("mapping is empty".to_string())),
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Err(invalid("document is null".to_string())),
        other => Err(invalid(format!("expected a mapping, found {}", kind(&other)))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
