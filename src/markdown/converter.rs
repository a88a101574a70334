//! Markdown converter with pluggable fence and math rules.

use anyhow::{Context, Result, bail};
use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{Arena, Options};

use super::fence::CodeBlockToken;
use super::highlight::SyntaxHighlight;
use super::math::{MathToken, MathTypeset};
use crate::util::escape_html;

/// Renders one fenced code block to HTML.
pub type FenceRule = Box<dyn Fn(&CodeBlockToken) -> String>;

/// Renders one math expression to HTML.
pub type MathRule = Box<dyn Fn(&MathToken) -> String>;

/// Rendering rules that extensions install into a [`Converter`].
///
/// A rule left as `None` falls back to comrak's own output for that node.
#[derive(Default)]
pub struct Rules {
    pub fence: Option<FenceRule>,
    pub math: Option<MathRule>,
}

/// Feature registered into a [`Converter`].
pub trait Extension {
    /// Unique extension name, used to reject duplicate registration.
    fn name(&self) -> &'static str;

    /// Installs rules and parser options into the converter.
    ///
    /// # Errors
    ///
    /// Returns error if the extension cannot operate on this converter.
    fn register(&self, converter: &mut Converter) -> Result<()>;
}

/// Markdown to HTML converter built on comrak.
///
/// Parses markdown into an AST, rewrites fenced code blocks and math
/// nodes through the registered rules, and formats the result as HTML.
/// Raw HTML typed into the message is escaped and shown as text, so the
/// only markup in the output is produced by comrak or by the rules.
pub struct Converter {
    options: Options<'static>,
    rules: Rules,
    extensions: Vec<&'static str>,
}

impl Converter {
    /// Creates converter with the chat message base options.
    ///
    /// Enables tables and strikethrough. Raw HTML rendering is switched on
    /// at the formatter level because every raw HTML node left in the tree
    /// after rewriting was produced by a rule; user HTML is escaped first.
    pub fn new() -> Self {
        let mut options = Options::default();

        options.extension.strikethrough = true;
        options.extension.table = true;

        options.render.unsafe_ = true;

        Self {
            options,
            rules: Rules::default(),
            extensions: Vec::new(),
        }
    }

    /// Registers an extension, consuming and returning the converter.
    ///
    /// # Errors
    ///
    /// Returns error if an extension with the same name is already
    /// registered or if the extension refuses to register.
    pub fn use_extension<E: Extension>(mut self, extension: E) -> Result<Self> {
        let name = extension.name();
        if self.has_extension(name) {
            bail!("Extension already registered: {}", name);
        }

        extension
            .register(&mut self)
            .with_context(|| format!("Failed to register {} extension", name))?;
        self.extensions.push(name);

        Ok(self)
    }

    /// Returns whether an extension with this name has been registered.
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|registered| *registered == name)
    }

    /// Registered extension names in registration order.
    pub fn extensions(&self) -> &[&'static str] {
        &self.extensions
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut Rules {
        &mut self.rules
    }

    pub(crate) fn options_mut(&mut self) -> &mut Options<'static> {
        &mut self.options
    }

    /// Replaces the fence rule with one built from the current rule.
    ///
    /// The wrapper receives the current rule (if any) by value and returns
    /// the rule to install, so interception is plain function composition.
    pub fn wrap_fence_rule(&mut self, wrap: impl FnOnce(Option<FenceRule>) -> FenceRule) {
        let base = self.rules.fence.take();
        self.rules.fence = Some(wrap(base));
    }

    /// Renders markdown content to HTML string.
    ///
    /// # Arguments
    ///
    /// * `markdown`: Untrusted markdown text
    ///
    /// # Returns
    ///
    /// Rendered HTML as string
    ///
    /// # Errors
    ///
    /// Returns error if HTML formatting fails
    pub fn render(&self, markdown: &str) -> Result<String> {
        let arena = Arena::new();
        let root = comrak::parse_document(&arena, markdown, &self.options);

        // Fences are rewritten before math is typeset
        self.rewrite_blocks(root);
        self.rewrite_math(root);

        let mut output = Vec::with_capacity(markdown.len() * 2);
        comrak::format_html(root, &self.options, &mut output)
            .context("Failed to format markdown AST as HTML")?;

        String::from_utf8(output).context("Rendered HTML contains invalid UTF8")
    }

    /// Escapes user HTML, neutralizes unsafe links and applies the fence rule.
    fn rewrite_blocks<'a>(&self, root: &'a AstNode<'a>) {
        for node in root.descendants() {
            let mut ast = node.data.borrow_mut();

            let replacement = match &mut ast.value {
                NodeValue::HtmlBlock(block) => {
                    block.literal = format!("<p>{}</p>\n", escape_html(block.literal.trim_end()));
                    None
                }
                NodeValue::HtmlInline(raw) => {
                    *raw = escape_html(raw);
                    None
                }
                NodeValue::Link(link) | NodeValue::Image(link) => {
                    if is_unsafe_url(&link.url) {
                        link.url.clear();
                    }
                    None
                }
                NodeValue::CodeBlock(block) if block.fenced => self
                    .rules
                    .fence
                    .as_ref()
                    .map(|rule| rule(&CodeBlockToken::from_block(block))),
                _ => None,
            };

            if let Some(mut literal) = replacement {
                if !literal.is_empty() {
                    literal.push('\n');
                }
                ast.value = NodeValue::HtmlBlock(NodeHtmlBlock {
                    block_type: 0,
                    literal,
                });
            }
        }
    }

    fn rewrite_math<'a>(&self, root: &'a AstNode<'a>) {
        let Some(rule) = &self.rules.math else {
            return;
        };

        for node in root.descendants() {
            let mut ast = node.data.borrow_mut();
            if let NodeValue::Math(math) = &ast.value {
                let html = rule(&MathToken::from_node(math));
                ast.value = NodeValue::HtmlInline(html);
            }
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the converter used for chat messages.
///
/// Registers syntax highlighting first and math typesetting second. The
/// order is fixed: fenced blocks must be claimed by the highlighter before
/// math delimiters are interpreted.
///
/// # Errors
///
/// Returns error if either extension fails to register.
pub fn build_converter() -> Result<Converter> {
    Converter::new()
        .use_extension(SyntaxHighlight::new())?
        .use_extension(MathTypeset::new())
}

/// Returns whether a link target uses a script or file scheme.
///
/// Inline `data:` URLs are only allowed for common raster image types.
fn is_unsafe_url(url: &str) -> bool {
    const BLOCKED: &[&str] = &["javascript:", "vbscript:", "file:", "data:"];
    const IMAGE_DATA: &[&str] = &[
        "data:image/gif;",
        "data:image/png;",
        "data:image/jpeg;",
        "data:image/webp;",
    ];

    let normalized = url.trim().to_ascii_lowercase();
    if !BLOCKED.iter().any(|scheme| normalized.starts_with(scheme)) {
        return false;
    }

    !IMAGE_DATA.iter().any(|prefix| normalized.starts_with(prefix))
}
