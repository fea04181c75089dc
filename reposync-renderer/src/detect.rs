//! Template detection.
//!
//! A file is a template when its first bytes are the Mustache set-delimiter
//! tag [`TEMPLATE_MARKER`]. The check sits behind [`TemplateDetector`] so a
//! caller can swap in another strategy (or a plain closure).

/// Marker that switches the Mustache delimiters to `<% %>`.
pub const TEMPLATE_MARKER: &str = "{{=<% %>=}}";

/// Decides whether raw file content should go through the template engine.
pub trait TemplateDetector: Send + Sync {
    fn is_template(&self, content: &[u8]) -> bool;
}

impl<F> TemplateDetector for F
where
    F: Fn(&[u8]) -> bool + Send + Sync,
{
    fn is_template(&self, content: &[u8]) -> bool {
        self(content)
    }
}

/// Prefix-based detector. Content must also be valid UTF-8, since the engine
/// works on text; anything else is copied through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerDetector {
    marker: String,
}

impl MarkerDetector {
    pub fn new(marker: impl Into<String>) -> Self {
        MarkerDetector {
            marker: marker.into(),
        }
    }
}

impl Default for MarkerDetector {
    fn default() -> Self {
        MarkerDetector::new(TEMPLATE_MARKER)
    }
}

impl TemplateDetector for MarkerDetector {
    fn is_template(&self, content: &[u8]) -> bool {
        content.starts_with(self.marker.as_bytes()) && std::str::from_utf8(content).is_ok()
    }
}
