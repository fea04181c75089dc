//! Template engine and the per-file [`Renderer`].
//!
//! The renderer reads a source file completely, asks its [`TemplateDetector`]
//! whether it is a template, and either passes the bytes through unchanged or
//! renders them with the companion values through a [`TemplateEngine`].
//! Writing the result is left to the caller.

use std::path::{Path, PathBuf};

use reposync_core::RepoId;

use crate::detect::{MarkerDetector, TemplateDetector};
use crate::error::{io_err, EngineError, RenderError};
use crate::values::{load_values, TemplateValues};

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Renders template text against a values mapping.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, values: &TemplateValues) -> Result<String, EngineError>;
}

/// Mustache engine. The template marker is a Mustache set-delimiter tag, so
/// `<% key %>` placeholders resolve against the values mapping; missing keys
/// render empty.
///
/// Partial tags (`<%> key %>`) also resolve against the values mapping and
/// insert the value unescaped. Partials are never loaded from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct MustacheEngine;

impl TemplateEngine for MustacheEngine {
    fn render(&self, template: &str, values: &TemplateValues) -> Result<String, EngineError> {
        let compiled = mustache::compile_str(&inline_partials(template))?;
        let mut out = Vec::with_capacity(template.len());
        compiled.render(&mut out, values)?;
        Ok(String::from_utf8(out)?)
    }
}

/// Rewrite every partial tag into an unescaped variable tag (`>` becomes
/// `&`), tracking set-delimiter tags so the current delimiters are known at
/// each position. Other tags and plain text pass through untouched.
pub(crate) fn inline_partials(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut open = String::from("{{");
    let mut close = String::from("}}");
    let mut rest = template;

    while let Some(start) = rest.find(open.as_str()) {
        let body_start = start + open.len();
        out.push_str(&rest[..body_start]);
        rest = &rest[body_start..];

        let end_delim = if open == "{{" && rest.starts_with('{') {
            String::from("}}}")
        } else {
            close.clone()
        };
        let Some(end) = rest.find(end_delim.as_str()) else {
            break;
        };
        let body = &rest[..end];

        let mut delimiters = None;
        if let Some(name) = body.strip_prefix('>') {
            out.push('&');
            out.push_str(name);
        } else {
            if let Some(spec) = body.strip_prefix('=').and_then(|b| b.strip_suffix('=')) {
                let mut parts = spec.split_whitespace();
                if let (Some(o), Some(c), None) = (parts.next(), parts.next(), parts.next()) {
                    delimiters = Some((o.to_string(), c.to_string()));
                }
            }
            out.push_str(body);
        }
        out.push_str(&end_delim);
        rest = &rest[end + end_delim.len()..];

        if let Some((o, c)) = delimiters {
            open = o;
            close = c;
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Destination content for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: Vec<u8>,
    /// Whether the content went through the template engine.
    pub templated: bool,
    /// Companion values file that fed the render, if one existed.
    pub values_file: Option<PathBuf>,
}

/// Per-file renderer. Create once and reuse for a whole run.
pub struct Renderer {
    detector: Box<dyn TemplateDetector>,
    engine: Box<dyn TemplateEngine>,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

impl Renderer {
    /// Marker detection plus Mustache rendering.
    pub fn new() -> Self {
        Renderer {
            detector: Box::new(MarkerDetector::default()),
            engine: Box::new(MustacheEngine),
        }
    }

    pub fn with_detector(mut self, detector: impl TemplateDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn with_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Produce the destination content for `source` as seen by `repo`.
    ///
    /// Non-templates come back byte-for-byte identical. Templates without a
    /// values file render against an empty mapping.
    pub fn render_file(&self, source: &Path, repo: &RepoId) -> Result<Rendered, RenderError> {
        let content = std::fs::read(source).map_err(|e| io_err(source, e))?;
        if !self.detector.is_template(&content) {
            return Ok(Rendered {
                content,
                templated: false,
                values_file: None,
            });
        }

        let (values, values_file) = load_values(source, repo)?;
        let text = String::from_utf8_lossy(&content);
        tracing::info!(
            "templating {} with {} top-level value(s)",
            source.display(),
            values.len()
        );
        let rendered = self
            .engine
            .render(&text, &values)
            .map_err(|e| RenderError::Template {
                path: source.to_path_buf(),
                source: e,
            })?;

        Ok(Rendered {
            content: rendered.into_bytes(),
            templated: true,
            values_file,
        })
    }

    /// Render `source` and write the result to `dest`, overwriting it.
    ///
    /// Nothing is written unless rendering succeeded in full.
    pub fn copy_templated(
        &self,
        source: &Path,
        dest: &Path,
        repo: &RepoId,
    ) -> Result<Rendered, RenderError> {
        tracing::info!("CP: {} TO {}", source.display(), dest.display());
        let rendered = self.render_file(source, repo)?;
        std::fs::write(dest, &rendered.content).map_err(|e| io_err(dest, e))?;
        Ok(rendered)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
