//! Copy-to-clipboard affordances on rendered messages.
//!
//! Rendered HTML is handed to a display surface through [`HtmlSink`]. Once
//! the surface is attached, [`CopyController`] binds one click listener per
//! copy affordance; each click writes the block's decoded source to the
//! [`Clipboard`] on a [`TaskSpawner`] and reports success through a
//! [`Notifier`].

mod clipboard;
mod controller;
mod surface;

pub use clipboard::{
    Clipboard, ClipboardError, CopyTask, LogNotifier, Notifier, TaskSpawner, UnavailableClipboard,
};
pub use controller::{
    BindingState, COPY_SUCCESS_MESSAGE, CopyBinding, CopyController, NOTIFY_AUTO_DISMISS,
};
pub use surface::{
    Affordance, AffordanceHandle, ClickEvent, ClickListener, ClickOutcome, HtmlSink, HtmlSurface,
    ListenerId, Surface,
};
