//! Copy affordance listener lifecycle.

use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, warn};

use super::clipboard::{Clipboard, Notifier, TaskSpawner};
use super::surface::{AffordanceHandle, ClickEvent, ClickListener, ListenerId, Surface};
use crate::markdown::decode_payload;

/// Notification shown after a successful copy.
pub const COPY_SUCCESS_MESSAGE: &str = "code copied";

/// How long the copy notification stays visible.
pub const NOTIFY_AUTO_DISMISS: Duration = Duration::from_millis(1000);

/// Listener state of one display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Content present, no listeners attached.
    Unbound,
    /// `bind` ran for the current content. Every affordance the surface
    /// accepted a listener for has exactly one; rejected ones are logged
    /// and left without a binding.
    Bound,
    /// Surface discarded; binding is no longer possible.
    TornDown,
}

/// Listener attached to one affordance element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyBinding {
    pub handle: AffordanceHandle,
    pub decoded_source: String,
    pub listener: ListenerId,
}

/// Attaches and detaches copy listeners for one display surface.
///
/// `bind` runs after rendered content is attached, `unbind` before the
/// content is replaced, and `teardown` when the surface is discarded. The
/// controller only ever removes listeners it attached itself, so surfaces
/// and controllers can be bound and unbound in any relative order.
///
/// Replacing the surface content without calling `unbind` first leaves
/// [`bindings`](Self::bindings) describing the old content until the next
/// `bind`, which drops the stale entries before binding the new ones.
///
/// Clicks hand the clipboard write to the [`TaskSpawner`]; nothing runs
/// on the click itself, so a click never fails or blocks.
pub struct CopyController {
    clipboard: Rc<dyn Clipboard>,
    notifier: Rc<dyn Notifier>,
    spawner: Rc<dyn TaskSpawner>,
    bindings: Vec<CopyBinding>,
    state: BindingState,
    alive: Option<Rc<()>>,
}

impl CopyController {
    pub fn new(
        clipboard: Rc<dyn Clipboard>,
        notifier: Rc<dyn Notifier>,
        spawner: Rc<dyn TaskSpawner>,
    ) -> Self {
        Self {
            clipboard,
            notifier,
            spawner,
            bindings: Vec::new(),
            state: BindingState::Unbound,
            alive: Some(Rc::new(())),
        }
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    /// Bindings made by the last `bind`, in document order of their
    /// affordances.
    pub fn bindings(&self) -> &[CopyBinding] {
        &self.bindings
    }

    /// Attaches one copy listener to every affordance on the surface.
    ///
    /// Previous bindings are removed first, so repeated calls never stack
    /// listeners. Does nothing once torn down or while the surface is
    /// detached.
    pub fn bind<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.state == BindingState::TornDown {
            debug!("Ignoring bind on torn down surface");
            return;
        }
        if !surface.is_attached() {
            debug!("Ignoring bind on detached surface");
            return;
        }

        self.unbind(surface);

        for affordance in surface.affordances() {
            let decoded_source = decode_payload(&affordance.payload);
            let listener = self.copy_listener(&decoded_source);

            match surface.add_click_listener(affordance.handle, listener) {
                Some(id) => self.bindings.push(CopyBinding {
                    handle: affordance.handle,
                    decoded_source,
                    listener: id,
                }),
                None => warn!(handle = ?affordance.handle, "Surface rejected copy listener"),
            }
        }

        self.state = BindingState::Bound;
        debug!(bindings = self.bindings.len(), "Bound copy affordances");
    }

    /// Removes every listener attached by [`bind`](Self::bind).
    ///
    /// Idempotent; calling it without bindings does nothing.
    pub fn unbind<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.bindings.is_empty() {
            if self.state == BindingState::Bound {
                self.state = BindingState::Unbound;
            }
            return;
        }

        let count = self.bindings.len();
        for binding in self.bindings.drain(..) {
            if !surface.remove_click_listener(binding.handle, binding.listener) {
                debug!(handle = ?binding.handle, "Copy listener already gone");
            }
        }

        if self.state == BindingState::Bound {
            self.state = BindingState::Unbound;
        }
        debug!(removed = count, "Unbound copy affordances");
    }

    /// Replaces bindings after the surface content changed.
    pub fn rebind<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.unbind(surface);
        self.bind(surface);
    }

    /// Unbinds and stops all further binding.
    ///
    /// Clipboard writes still in flight settle silently afterwards.
    pub fn teardown<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.unbind(surface);
        self.state = BindingState::TornDown;
        self.alive = None;
    }

    fn copy_listener(&self, source: &str) -> ClickListener {
        let clipboard = Rc::clone(&self.clipboard);
        let notifier = Rc::clone(&self.notifier);
        let spawner = Rc::clone(&self.spawner);
        let alive: Weak<()> = self.alive.as_ref().map(Rc::downgrade).unwrap_or_default();
        let source: Rc<str> = Rc::from(source);

        Rc::new(move |event: &mut ClickEvent| {
            event.stop_propagation();

            let clipboard = Rc::clone(&clipboard);
            let notifier = Rc::clone(&notifier);
            let alive = Weak::clone(&alive);
            let text = Rc::clone(&source);

            spawner.spawn_task(Box::pin(async move {
                match clipboard.write_text(&text).await {
                    Ok(()) if alive.upgrade().is_some() => {
                        notifier.success(COPY_SUCCESS_MESSAGE, NOTIFY_AUTO_DISMISS);
                    }
                    Ok(()) => debug!("Copy finished after surface teardown"),
                    Err(error) => debug!(%error, "Clipboard write failed"),
                }
            }));
        })
    }
}
