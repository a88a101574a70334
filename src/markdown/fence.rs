//! Fenced code block interception and copy payload encoding.

use comrak::nodes::NodeCodeBlock;
use maud::{PreEscaped, html};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::warn;

use super::converter::FenceRule;

/// Class name marking the copy affordance element.
pub const COPY_CLASS: &str = "copy";

/// Attribute carrying the percent encoded block source.
pub const CODE_ATTRIBUTE: &str = "data-code";

/// Characters left unescaped, matching JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Fenced code block seen during one conversion pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockToken {
    /// Block content without the line break before the closing fence.
    pub raw_source: String,
    /// First word of the info string, if any.
    pub language_hint: Option<String>,
}

impl CodeBlockToken {
    pub fn new(raw_source: impl Into<String>, language_hint: Option<&str>) -> Self {
        Self {
            raw_source: raw_source.into(),
            language_hint: language_hint.map(String::from),
        }
    }

    pub(crate) fn from_block(block: &NodeCodeBlock) -> Self {
        let literal = block.literal.as_str();
        let raw_source = literal.strip_suffix('\n').unwrap_or(literal);
        let language_hint = block.info.split_whitespace().next();

        Self::new(raw_source, language_hint)
    }
}

/// Percent encodes code block source for the copy attribute.
///
/// Every byte of the UTF8 encoding except ASCII alphanumerics and
/// `-_.!~*'()` is escaped, so the payload is attribute safe and survives
/// [`decode_payload`] unchanged for any Unicode input.
pub fn encode_payload(source: &str) -> String {
    utf8_percent_encode(source, COMPONENT).to_string()
}

/// Decodes a copy attribute payload back to the original source.
///
/// Payloads that decode to invalid UTF8 are repaired with replacement
/// characters instead of failing; payloads from [`encode_payload`] always
/// decode exactly.
pub fn decode_payload(payload: &str) -> String {
    percent_decode_str(payload).decode_utf8_lossy().into_owned()
}

/// Wraps a fence rule so each block carries a copy affordance.
///
/// The returned rule emits a container holding the affordance element, with
/// the block source encoded into its `data-code` attribute, followed by the
/// unchanged output of `base`. Without a base rule every fenced block
/// renders as empty output; the rest of the message still renders.
///
/// # Arguments
///
/// * `base`: Fence rule producing the highlighted block markup
///
/// # Returns
///
/// Fence rule producing the wrapped markup
pub fn intercept_fence(base: Option<FenceRule>) -> FenceRule {
    let Some(base) = base else {
        warn!("No base fence renderer registered, fenced code blocks render empty");
        return Box::new(|_: &CodeBlockToken| String::new());
    };

    Box::new(move |token: &CodeBlockToken| {
        let highlighted = base(token);

        html! {
            div class="highlight-js-pre-container" {
                div class="copy" data-code=(encode_payload(&token.raw_source)) {
                    i class="fa fa-clipboard" aria-hidden="true" {}
                }
                (PreEscaped(highlighted))
            }
        }
        .into_string()
    })
}
