//! Page layout wrapper component

use maud::{DOCTYPE, Markup, html};

/// Icon font providing the clipboard, trash and avatar glyphs.
const ICON_STYLESHEET: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css";

/// Wraps message markup in a standalone HTML document.
///
/// # Arguments
///
/// * `title`: Page title text
/// * `stylesheets`: CSS file paths to include after the icon font
/// * `body`: Conversation markup
///
/// # Returns
///
/// Complete HTML document with wrapped content
pub fn page_wrapper(title: &str, stylesheets: &[&str], body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(ICON_STYLESHEET);
                @for stylesheet in stylesheets {
                    link rel="stylesheet" href=(stylesheet);
                }
            }
            body {
                main class="conversation" {
                    (body)
                }
            }
        }
    }
}
