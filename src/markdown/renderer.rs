//! Chat message rendering with copyable code blocks.

use anyhow::{Context, Result};
use std::fmt;

use super::converter::{Converter, build_converter};
use super::fence::intercept_fence;

/// HTML produced by [`MessageRenderer`].
///
/// Only the crate can construct a value, so anything handed to an
/// [`HtmlSink`](crate::copy::HtmlSink) went through the converter: message
/// text is escaped, and the only raw markup comes from the rendering rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    pub(crate) fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rendered message content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedOutput {
    pub html: TrustedHtml,
}

impl RenderedOutput {
    pub fn as_str(&self) -> &str {
        self.html.as_str()
    }
}

/// Renders chat message markdown to HTML.
///
/// Wraps the configured converter (syntax highlighting, then math) with the
/// fence interceptor so every fenced code block carries a copy affordance.
/// Rendering is deterministic: the same text always yields the same HTML.
pub struct MessageRenderer {
    converter: Converter,
}

impl MessageRenderer {
    /// Creates renderer with highlighting, math and copy affordances.
    ///
    /// # Errors
    ///
    /// Returns error if an extension fails to register.
    pub fn new() -> Result<Self> {
        let converter = build_converter().context("Failed to configure markdown converter")?;
        Ok(Self::with_converter(converter))
    }

    /// Creates renderer from a custom converter.
    ///
    /// The converter's current fence rule becomes the base rule of the
    /// interceptor. A converter without one renders fenced blocks empty.
    pub fn with_converter(mut converter: Converter) -> Self {
        converter.wrap_fence_rule(intercept_fence);
        Self { converter }
    }

    /// Renders message text to HTML.
    ///
    /// Absent or empty text renders to an empty string. Malformed markdown
    /// (unbalanced fences, unknown languages, invalid math) degrades to
    /// literal text.
    ///
    /// # Arguments
    ///
    /// * `text`: Raw message markdown, untrusted
    ///
    /// # Returns
    ///
    /// Rendered HTML
    ///
    /// # Errors
    ///
    /// Returns error if HTML formatting fails
    pub fn render(&self, text: Option<&str>) -> Result<RenderedOutput> {
        let text = text.unwrap_or_default();
        if text.is_empty() {
            return Ok(RenderedOutput::default());
        }

        let html = self
            .converter
            .render(text)
            .context("Failed to render message markdown")?;

        Ok(RenderedOutput {
            html: TrustedHtml::new(html),
        })
    }
}

/// Renders message text with a freshly configured renderer.
///
/// # Errors
///
/// Returns error if the renderer cannot be configured.
pub fn render_message(text: Option<&str>) -> Result<RenderedOutput> {
    MessageRenderer::new()?.render(text)
}
