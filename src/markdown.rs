//! Markdown rendering for chat messages.
//!
//! This module builds a comrak converter extended with syntect syntax
//! highlighting and MathML math typesetting, and wraps its fenced code
//! block rule so every block carries a copy affordance holding the block's
//! percent encoded source.

mod converter;
mod fence;
mod highlight;
mod math;
mod renderer;

pub use converter::{Converter, Extension, FenceRule, MathRule, Rules, build_converter};
pub use fence::{
    CODE_ATTRIBUTE, COPY_CLASS, CodeBlockToken, decode_payload, encode_payload, intercept_fence,
};
pub use highlight::{CLASS_PREFIX, SyntaxHighlight, default_syntaxes};
pub use math::{MathToken, MathTypeset, typeset};
pub use renderer::{MessageRenderer, RenderedOutput, TrustedHtml, render_message};
