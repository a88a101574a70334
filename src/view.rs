//! Message display lifecycle.

use anyhow::{Context, Result};
use maud::Markup;
use tracing::debug;

use crate::components::message::message_item;
use crate::copy::{CopyController, HtmlSink, Surface};
use crate::markdown::{MessageRenderer, RenderedOutput};
use crate::message::Message;

/// Host callbacks for the message controls.
#[derive(Default)]
pub struct MessageActions {
    pub show_retry: bool,
    pub on_retry: Option<Box<dyn Fn()>>,
    pub on_delete: Option<Box<dyn Fn(&str)>>,
}

impl MessageActions {
    /// The regenerate control needs both the flag and a callback.
    pub fn retry_visible(&self) -> bool {
        self.show_retry && self.on_retry.is_some()
    }
}

/// One message shown on a display surface.
///
/// Keeps the surface content and its copy listeners in step: content is
/// only replaced between an unbind and a bind, so no listener outlives the
/// element it was attached to. Attach the surface before mounting.
pub struct MessageView<S: Surface + HtmlSink> {
    message: Message,
    actions: MessageActions,
    renderer: MessageRenderer,
    controller: CopyController,
    surface: S,
    rendered: RenderedOutput,
}

impl<S: Surface + HtmlSink> MessageView<S> {
    pub fn new(
        message: Message,
        actions: MessageActions,
        renderer: MessageRenderer,
        controller: CopyController,
        surface: S,
    ) -> Self {
        Self {
            message,
            actions,
            renderer,
            controller,
            surface,
            rendered: RenderedOutput::default(),
        }
    }

    /// Renders the message into the surface and binds copy listeners.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be rendered.
    pub fn mount(&mut self) -> Result<()> {
        self.show()
            .with_context(|| format!("Failed to mount message {}", self.message.id()))
    }

    /// Replaces the displayed message.
    ///
    /// # Errors
    ///
    /// Returns error if the new message cannot be rendered; the surface
    /// then keeps the previous content without listeners.
    pub fn update(&mut self, message: Message) -> Result<()> {
        self.controller.unbind(&mut self.surface);
        self.message = message;
        self.show()
            .with_context(|| format!("Failed to update message {}", self.message.id()))
    }

    /// Tears down listeners and hands the surface back.
    pub fn unmount(mut self) -> S {
        self.controller.teardown(&mut self.surface);
        debug!(id = self.message.id(), "Unmounted message");
        self.surface
    }

    /// Requests removal of this message from the conversation.
    pub fn delete(&self) {
        if let Some(on_delete) = &self.actions.on_delete {
            on_delete(self.message.id());
        }
    }

    /// Requests a regenerated reply, when the control is visible.
    pub fn retry(&self) {
        if !self.actions.retry_visible() {
            return;
        }
        if let Some(on_retry) = &self.actions.on_retry {
            on_retry();
        }
    }

    /// Message item markup for the current content.
    pub fn markup(&self) -> Markup {
        message_item(
            &self.message,
            &self.rendered.html,
            self.actions.retry_visible(),
        )
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn rendered(&self) -> &RenderedOutput {
        &self.rendered
    }

    pub fn controller(&self) -> &CopyController {
        &self.controller
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn show(&mut self) -> Result<()> {
        self.rendered = self.renderer.render(Some(self.message.text()))?;
        self.surface.set_trusted_html(self.rendered.html.clone());
        self.controller.bind(&mut self.surface);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copy::{BindingState, HtmlSurface, LogNotifier, UnavailableClipboard};
    use crate::message::Role;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tokio::task::LocalSet;

    fn view(text: &str, actions: MessageActions) -> MessageView<HtmlSurface> {
        let mut surface = HtmlSurface::new();
        surface.attach();
        let controller = CopyController::new(
            Rc::new(UnavailableClipboard),
            Rc::new(LogNotifier),
            Rc::new(LocalSet::new()),
        );
        MessageView::new(
            Message::new("m1", Role::Assistant, text),
            actions,
            MessageRenderer::new().expect("Renderer should build"),
            controller,
            surface,
        )
    }

    #[test]
    fn test_mount_binds_every_block() {
        // Arrange
        let mut view = view("```js\na\n```\n\n```js\nb\n```", MessageActions::default());

        // Act
        view.mount().expect("Should mount");

        // Assert
        assert_eq!(view.surface().affordance_count(), 2);
        assert_eq!(view.surface().listener_count(), 2);
        assert_eq!(view.controller().state(), BindingState::Bound);
    }

    #[test]
    fn test_update_rebinds_to_new_content() {
        // Arrange
        let mut view = view("```js\na\n```\n\n```js\nb\n```", MessageActions::default());
        view.mount().expect("Should mount");

        // Act
        view.update(Message::new("m1", Role::Assistant, "```py\nc\n```"))
            .expect("Should update");

        // Assert
        assert_eq!(view.surface().listener_count(), 1);
        let sources: Vec<&str> = view
            .controller()
            .bindings()
            .iter()
            .map(|b| b.decoded_source.as_str())
            .collect();
        assert_eq!(sources, vec!["c"]);
    }

    #[test]
    fn test_unmount_releases_listeners() {
        // Arrange
        let mut view = view("```js\na\n```", MessageActions::default());
        view.mount().expect("Should mount");

        // Act
        let surface = view.unmount();

        // Assert
        assert_eq!(surface.listener_count(), 0);
        assert_eq!(surface.affordance_count(), 1, "Content stays in place");
    }

    #[test]
    fn test_delete_passes_message_id() {
        // Arrange
        let deleted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&deleted);
        let actions = MessageActions {
            on_delete: Some(Box::new(move |id: &str| sink.borrow_mut().push(id.to_string()))),
            ..MessageActions::default()
        };
        let view = view("hi", actions);

        // Act
        view.delete();

        // Assert
        assert_eq!(*deleted.borrow(), vec!["m1".to_string()]);
    }

    #[test]
    fn test_retry_requires_flag_and_callback() {
        // Arrange
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let hidden = view(
            "hi",
            MessageActions {
                show_retry: false,
                on_retry: Some(Box::new(|| {})),
                on_delete: None,
            },
        );
        let shown = view(
            "hi",
            MessageActions {
                show_retry: true,
                on_retry: Some(Box::new(move || *counter.borrow_mut() += 1)),
                on_delete: None,
            },
        );

        // Act
        hidden.retry();
        shown.retry();

        // Assert
        assert_eq!(*calls.borrow(), 1);
        assert!(!hidden.markup().into_string().contains("Regenerate"));
        assert!(shown.markup().into_string().contains("Regenerate"));
    }

    #[test]
    fn test_markup_contains_rendered_body() {
        // Arrange
        let mut view = view("**bold**", MessageActions::default());

        // Act
        view.mount().expect("Should mount");
        let html = view.markup().into_string();

        // Assert
        assert!(html.contains("<strong>bold</strong>"), "{}", html);
        assert!(html.contains("message-assistant"));
    }
}
