//! Utility functions for chatmark

/// Escapes HTML special characters.
///
/// Used for plain text fallbacks (unknown languages, invalid math, raw HTML
/// typed into a message) so untrusted text never reaches the page unescaped.
///
/// # Arguments
///
/// * `text`: Plain text to escape
///
/// # Returns
///
/// HTML safe string
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Decodes the HTML entities produced by [`escape_html`] and by maud.
///
/// # Arguments
///
/// * `html`: HTML encoded string
///
/// # Returns
///
/// Decoded string with actual characters
pub fn unescape_html(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
