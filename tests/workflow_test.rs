//! Workflow integration tests for chatmark.
//!
//! Tests the message view lifecycle from mount through updates to unmount,
//! including clicks that race with content changes.

mod common;

use anyhow::Result;
use chatmark::{
    BindingState, HtmlSurface, Message, MessageActions, MessageRenderer, MessageView, Role,
    components,
};
use common::{RecordingClipboard, RecordingNotifier, recording_controller_on, settle};
use std::rc::Rc;
use tokio::task::LocalSet;

fn mounted_view_on(
    text: &str,
    tasks: &Rc<LocalSet>,
) -> Result<(
    MessageView<HtmlSurface>,
    Rc<RecordingClipboard>,
    Rc<RecordingNotifier>,
)> {
    let (controller, clipboard, notifier) = recording_controller_on(tasks);
    let mut surface = HtmlSurface::new();
    surface.attach();
    let mut view = MessageView::new(
        Message::new("m1", Role::Assistant, text),
        MessageActions::default(),
        MessageRenderer::new()?,
        controller,
        surface,
    );
    view.mount()?;
    Ok((view, clipboard, notifier))
}

fn mounted_view(
    text: &str,
) -> Result<(
    MessageView<HtmlSurface>,
    Rc<RecordingClipboard>,
    Rc<RecordingNotifier>,
)> {
    mounted_view_on(text, &Rc::new(LocalSet::new()))
}

/// Tests updating from N blocks to M blocks leaves exactly M listeners.
#[test]
fn test_update_changes_listener_count() -> Result<()> {
    // Arrange
    let (mut view, _, _) = mounted_view("```\na\n```\n\n```\nb\n```\n\n```\nc\n```")?;
    let before = view.surface().listener_count();

    // Act
    view.update(Message::new("m1", Role::Assistant, "```\nd\n```"))?;

    // Assert
    assert_eq!(before, 3);
    assert_eq!(view.surface().listener_count(), 1);
    assert_eq!(view.controller().bindings()[0].decoded_source, "d");
    Ok(())
}

/// Tests a message updated to plain text has no listeners.
#[test]
fn test_update_to_plain_text() -> Result<()> {
    // Arrange
    let (mut view, _, _) = mounted_view("```\na\n```")?;

    // Act
    view.update(Message::new("m1", Role::Assistant, "just text"))?;

    // Assert
    assert_eq!(view.surface().listener_count(), 0);
    assert_eq!(view.controller().state(), BindingState::Bound);
    Ok(())
}

/// Tests streaming updates never accumulate listeners.
#[test]
fn test_streaming_updates_do_not_stack() -> Result<()> {
    // Arrange
    let (mut view, _, _) = mounted_view("")?;
    let chunks = ["```py\n", "```py\nprint(1)", "```py\nprint(1)\n```", "```py\nprint(1)\n```\n\nDone."];

    // Act
    let mut counts = Vec::new();
    for chunk in chunks {
        view.update(Message::new("m1", Role::Assistant, chunk))?;
        counts.push(view.surface().listener_count());
    }

    // Assert
    assert_eq!(counts, vec![1, 1, 1, 1]);
    assert_eq!(view.controller().bindings()[0].decoded_source, "print(1)");
    Ok(())
}

/// Tests clicks after an update copy the new content only.
#[tokio::test(flavor = "current_thread")]
async fn test_click_after_update_uses_new_source() -> Result<()> {
    let tasks = Rc::new(LocalSet::new());
    tasks
        .run_until(async {
            // Arrange
            let (mut view, clipboard, notifier) = mounted_view_on("```\nold\n```", &tasks)?;

            // Act
            view.update(Message::new("m1", Role::Assistant, "```\nnew\n```"))?;
            view.surface().click(0);
            settle().await;

            // Assert
            assert_eq!(clipboard.writes(), vec!["new".to_string()]);
            assert_eq!(notifier.notes().len(), 1);
            Ok::<(), anyhow::Error>(())
        })
        .await
}

/// Tests a copy in flight during unmount never notifies.
#[tokio::test(flavor = "current_thread")]
async fn test_unmount_during_copy_suppresses_notification() -> Result<()> {
    let tasks = Rc::new(LocalSet::new());
    tasks
        .run_until(async {
            // Arrange
            let (view, clipboard, notifier) = mounted_view_on("```\nslow\n```", &tasks)?;

            // Act
            view.surface().click(0);
            let surface = view.unmount();
            settle().await;

            // Assert
            assert_eq!(clipboard.writes(), vec!["slow".to_string()]);
            assert!(notifier.notes().is_empty());
            assert_eq!(surface.listener_count(), 0);
            Ok::<(), anyhow::Error>(())
        })
        .await
}

/// Tests the page wrapper embeds the message markup.
#[test]
fn test_view_markup_in_page() -> Result<()> {
    // Arrange
    let (view, _, _) = mounted_view("Hi `there`\n\n```js\nx()\n```")?;

    // Act
    let page =
        components::layout::page_wrapper("Chat", &["assets/message.css"], view.markup()).into_string();

    // Assert
    assert!(page.contains("<code>there</code>"), "{}", page);
    assert!(page.contains("class=\"copy\""));
    assert!(page.contains("class=\"message message-assistant\""));
    Ok(())
}
