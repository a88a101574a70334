//! Syntax highlighting extension for fenced code blocks.

use anyhow::{Context, Result, bail};
use maud::{PreEscaped, html};
use std::sync::OnceLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::warn;

use super::converter::{Converter, Extension};
use super::fence::CodeBlockToken;
use crate::util::escape_html;

/// Class prefix for highlighted spans, matching highlight.js stylesheets.
pub const CLASS_PREFIX: &str = "hljs-";

static DEFAULT_SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();

/// Returns the bundled syntect syntax definitions, loading them once.
pub fn default_syntaxes() -> &'static SyntaxSet {
    DEFAULT_SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Highlights fenced code blocks with syntect using CSS classes.
///
/// Installs the base fence rule, which renders a block as
/// `<pre><code class="hljs language-LANG">` with `hljs-` prefixed spans.
/// Blocks without a language hint are detected from their first line when
/// possible (shebangs, XML declarations); anything else is escaped text.
pub struct SyntaxHighlight {
    syntax_set: &'static SyntaxSet,
}

impl SyntaxHighlight {
    pub const NAME: &'static str = "syntax-highlight";

    /// Creates extension backed by the default syntax definitions.
    pub fn new() -> Self {
        Self::with_syntax_set(default_syntaxes())
    }

    /// Creates extension backed by custom syntax definitions.
    pub fn with_syntax_set(syntax_set: &'static SyntaxSet) -> Self {
        Self { syntax_set }
    }
}

impl Default for SyntaxHighlight {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for SyntaxHighlight {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register(&self, converter: &mut Converter) -> Result<()> {
        if self.syntax_set.syntaxes().is_empty() {
            bail!("Syntax set contains no syntax definitions");
        }

        let rules = converter.rules_mut();
        if rules.fence.is_some() {
            bail!("A fence renderer is already registered");
        }

        let syntax_set = self.syntax_set;
        rules.fence = Some(Box::new(move |token: &CodeBlockToken| {
            render_fence(syntax_set, token)
        }));

        Ok(())
    }
}

/// Renders one fenced block as highlighted `pre`/`code` markup.
///
/// Highlighting failures degrade to escaped plain text so a single odd
/// block never breaks the rest of the message.
fn render_fence(syntax_set: &SyntaxSet, token: &CodeBlockToken) -> String {
    let language = token.language_hint.as_deref();

    let mut code = token.raw_source.clone();
    if !code.is_empty() {
        code.push('\n');
    }

    let body = highlight_code(syntax_set, &code, language).unwrap_or_else(|e| {
        warn!(language = ?language, error = %e, "Falling back to plain code block");
        escape_html(&code)
    });

    let class = match language {
        Some(lang) => format!("hljs language-{}", lang),
        None => "hljs".to_string(),
    };

    html! {
        pre { code class=(class) { (PreEscaped(body)) } }
    }
    .into_string()
}

/// Highlights code with syntect using CSS classes.
///
/// # Arguments
///
/// * `syntax_set`: Syntax definitions to search
/// * `code`: Source code to highlight
/// * `language`: Language identifier (rust, js, python, etc)
///
/// # Returns
///
/// HTML string with `<span class="hljs-*">` tags, or escaped text when no
/// syntax matches
///
/// # Errors
///
/// Returns error if syntect fails to parse a line
fn highlight_code(syntax_set: &SyntaxSet, code: &str, language: Option<&str>) -> Result<String> {
    if code.is_empty() {
        return Ok(String::new());
    }

    let syntax = match language {
        Some(lang) => syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| syntax_set.find_syntax_by_extension(lang)),
        None => code
            .lines()
            .next()
            .and_then(|line| syntax_set.find_syntax_by_first_line(line)),
    };

    let Some(syntax) = syntax else {
        return Ok(escape_html(code));
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        syntax_set,
        ClassStyle::SpacedPrefixed {
            prefix: CLASS_PREFIX,
        },
    );

    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .context("Failed to parse line for syntax highlighting")?;
    }

    Ok(generator.finalize())
}
