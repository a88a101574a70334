//! Chat message rendering with copyable code blocks.

mod assets;
pub mod components;
mod config;
pub mod copy;
pub mod markdown;
mod message;
mod util;
mod view;

pub use assets::{HIGHLIGHT_CSS, MESSAGE_CSS, highlight_css, theme_exists, write_css_assets};
pub use config::Config;
pub use copy::{
    BindingState, COPY_SUCCESS_MESSAGE, Clipboard, ClipboardError, CopyBinding, CopyController,
    HtmlSink, HtmlSurface, LogNotifier, NOTIFY_AUTO_DISMISS, Notifier, Surface, TaskSpawner,
    UnavailableClipboard,
};
pub use markdown::{
    CODE_ATTRIBUTE, COPY_CLASS, CodeBlockToken, Converter, Extension, MathTypeset,
    MessageRenderer, RenderedOutput, SyntaxHighlight, TrustedHtml, build_converter,
    decode_payload, encode_payload, intercept_fence, render_message,
};
pub use message::{Message, Role};
pub use util::{escape_html, unescape_html};
pub use view::{MessageActions, MessageView};
