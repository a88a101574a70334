//! Message item component

use maud::{Markup, PreEscaped, html};

use crate::markdown::TrustedHtml;
use crate::message::{Message, Role};

/// Avatar image edge length in pixels.
const AVATAR_SIZE: u32 = 40;

/// Renders one chat message with its controls.
///
/// User messages put the avatar on the right, assistant messages on the
/// left; an empty placeholder column balances the other side. The delete
/// control carries the message id so a host can route it back.
///
/// # Arguments
///
/// * `message`: Message being displayed
/// * `content`: Rendered message body
/// * `show_retry`: Whether to emit the regenerate control
///
/// # Returns
///
/// Message item markup
pub fn message_item(message: &Message, content: &TrustedHtml, show_retry: bool) -> Markup {
    html! {
        div class={"message message-" (message.role().as_str())} data-message-id=(message.id()) {
            i class="fas fa-trash-alt remove-message" data-message-id=(message.id()) {}
            @match message.role() {
                Role::User => {
                    div class="placeholder" {}
                    (message_content(content))
                    (avatar(message))
                }
                Role::Assistant => {
                    (avatar(message))
                    (message_content(content))
                    div class="placeholder" {}
                }
            }
            @if show_retry {
                div class="regenerate-btn" { "Regenerate" }
            }
        }
    }
}

/// Content column holding rendered markdown.
pub fn message_content(content: &TrustedHtml) -> Markup {
    html! {
        div class="content" {
            (PreEscaped(content.as_str()))
        }
    }
}

fn avatar(message: &Message) -> Markup {
    let role = message.role();
    html! {
        div class={"avatar " (role.as_str())} {
            @if let Some(url) = message.avatar_url() {
                img class="img" src=(url) width=(AVATAR_SIZE) height=(AVATAR_SIZE) alt=(role.avatar_alt());
            }
        }
    }
}
