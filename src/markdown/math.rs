//! Math typesetting extension.

use anyhow::{Result, bail};
use comrak::nodes::NodeMath;
use latex2mathml::{DisplayStyle, latex_to_mathml};
use maud::{PreEscaped, html};
use tracing::debug;

use super::converter::{Converter, Extension};
use super::highlight::SyntaxHighlight;

/// Math expression found between `$` or `$$` delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathToken {
    pub literal: String,
    pub display: bool,
}

impl MathToken {
    pub fn new(literal: impl Into<String>, display: bool) -> Self {
        Self {
            literal: literal.into(),
            display,
        }
    }

    pub(crate) fn from_node(node: &NodeMath) -> Self {
        Self::new(node.literal.clone(), node.display_math)
    }

    fn delimiter(&self) -> &'static str {
        if self.display { "$$" } else { "$" }
    }
}

/// Typesets `$inline$` and `$$display$$` math as MathML.
///
/// Must be registered after [`SyntaxHighlight`] so fenced blocks are
/// claimed before dollar delimiters are interpreted.
pub struct MathTypeset;

impl MathTypeset {
    pub const NAME: &'static str = "math-typeset";

    pub fn new() -> Self {
        Self
    }
}

impl Default for MathTypeset {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for MathTypeset {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register(&self, converter: &mut Converter) -> Result<()> {
        if !converter.has_extension(SyntaxHighlight::NAME) {
            bail!("Math typesetting must be registered after syntax highlighting");
        }
        if converter.rules().math.is_some() {
            bail!("A math renderer is already registered");
        }

        converter.options_mut().extension.math_dollars = true;
        converter.rules_mut().math = Some(Box::new(|token: &MathToken| typeset(token)));

        Ok(())
    }
}

/// Renders math token as MathML wrapped in a classed span.
///
/// Expressions latex2mathml cannot parse are shown as their escaped source,
/// delimiters included, inside a `math-error` span.
pub fn typeset(token: &MathToken) -> String {
    let (style, class) = if token.display {
        (DisplayStyle::Block, "math math-display")
    } else {
        (DisplayStyle::Inline, "math math-inline")
    };

    match latex_to_mathml(&token.literal, style) {
        Ok(mathml) => html! {
            span class=(class) { (PreEscaped(mathml)) }
        }
        .into_string(),
        Err(e) => {
            debug!(error = ?e, literal = %token.literal, "Leaving math expression untypeset");
            let delimiter = token.delimiter();
            html! {
                span class="math-error" { (delimiter) (token.literal) (delimiter) }
            }
            .into_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typeset_inline() {
        // Arrange
        let token = MathToken::new("x^2", false);

        // Act
        let html = typeset(&token);

        // Assert
        assert!(html.starts_with("<span class=\"math math-inline\">"), "{}", html);
        assert!(html.contains("<math"), "{}", html);
        assert!(html.contains("<msup>"), "{}", html);
    }

    #[test]
    fn test_typeset_display() {
        // Arrange
        let token = MathToken::new(r"\frac{a}{b}", true);

        // Act
        let html = typeset(&token);

        // Assert
        assert!(html.contains("math-display"), "{}", html);
        assert!(html.contains("display=\"block\""), "{}", html);
        assert!(html.contains("<mfrac>"), "{}", html);
    }

    #[test]
    fn test_typeset_invalid_shows_escaped_source() {
        // Arrange
        let token = MathToken::new("x^{<", false);

        // Act
        let html = typeset(&token);

        // Assert
        assert!(html.contains("math-error"), "{}", html);
        assert!(html.contains("$x^{&lt;$"), "{}", html);
    }

    #[test]
    fn test_register_requires_highlighter_first() {
        // Arrange & Act
        let result = Converter::new().use_extension(MathTypeset::new());

        // Assert
        assert!(result.is_err(), "Math before highlighting should fail");
    }
}
