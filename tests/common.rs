//! Shared test utilities for integration tests.
//!
//! Provides recording clipboard and notifier doubles plus helpers for
//! driving spawned copy tasks on a current-thread runtime.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chatmark::{
    Clipboard, ClipboardError, CopyController, HtmlSink, HtmlSurface, MessageRenderer, Notifier,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;

/// Clipboard that records writes and can be told to fail.
#[derive(Default)]
pub struct RecordingClipboard {
    writes: RefCell<Vec<String>>,
    fail: Cell<bool>,
}

impl RecordingClipboard {
    pub fn failing() -> Self {
        let clipboard = Self::default();
        clipboard.fail.set(true);
        clipboard
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.writes.borrow_mut().push(text.to_string());
        tokio::task::yield_now().await;
        if self.fail.get() {
            Err(ClipboardError::PermissionDenied)
        } else {
            Ok(())
        }
    }
}

/// Notifier that records every success notification.
#[derive(Default)]
pub struct RecordingNotifier {
    notes: RefCell<Vec<(String, Duration)>>,
}

impl RecordingNotifier {
    pub fn notes(&self) -> Vec<(String, Duration)> {
        self.notes.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str, auto_dismiss: Duration) {
        self.notes
            .borrow_mut()
            .push((message.to_string(), auto_dismiss));
    }
}

/// Controller wired to fresh recording doubles, spawning onto `tasks`.
pub fn recording_controller_on(
    tasks: &Rc<LocalSet>,
) -> (CopyController, Rc<RecordingClipboard>, Rc<RecordingNotifier>) {
    let clipboard = Rc::new(RecordingClipboard::default());
    let notifier = Rc::new(RecordingNotifier::default());
    let controller = CopyController::new(clipboard.clone(), notifier.clone(), tasks.clone());
    (controller, clipboard, notifier)
}

/// Controller whose copy tasks queue on a set nobody drives.
pub fn recording_controller() -> (CopyController, Rc<RecordingClipboard>, Rc<RecordingNotifier>) {
    recording_controller_on(&Rc::new(LocalSet::new()))
}

/// Renders markdown into a fresh attached surface.
///
/// # Errors
///
/// Returns error if rendering fails
pub fn render_to_surface(markdown: &str) -> Result<HtmlSurface> {
    let output = MessageRenderer::new()?.render(Some(markdown))?;
    let mut surface = HtmlSurface::new();
    surface.set_trusted_html(output.html);
    surface.attach();
    Ok(surface)
}

/// Lets spawned local tasks run to completion.
///
/// Must be awaited inside `LocalSet::run_until`.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
