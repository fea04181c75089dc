//! # reposync-renderer
//!
//! Produces the destination content of a single template-repository file.
//! Files starting with the `{{=<% %>=}}` marker are rendered with Mustache
//! against their companion `<file>.<repo>.values.yml`; every other file is
//! copied through byte-for-byte.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use reposync_core::RepoId;
//! use reposync_renderer::Renderer;
//!
//! fn render_one(source: &Path) {
//!     let renderer = Renderer::new();
//!     if let Ok(rendered) = renderer.render_file(source, &RepoId::from("service-api")) {
//!         println!("{}: {} bytes", source.display(), rendered.content.len());
//!     }
//! }
//! ```

pub mod detect;
pub mod engine;
pub mod error;
pub mod values;

pub use detect::{MarkerDetector, TemplateDetector, TEMPLATE_MARKER};
pub use engine::{MustacheEngine, Rendered, Renderer, TemplateEngine};
pub use error::{EngineError, RenderError};
pub use values::{is_values_file, load_values, values_path, TemplateValues, VALUES_SUFFIX};
