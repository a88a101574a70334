//! Display surfaces holding rendered message HTML.

use std::collections::HashMap;
use std::rc::Rc;

use crate::markdown::{CODE_ATTRIBUTE, COPY_CLASS, TrustedHtml};
use crate::util::unescape_html;

/// Click handler attached to an affordance element.
pub type ClickListener = Rc<dyn Fn(&mut ClickEvent)>;

/// Click dispatched to affordance listeners, then to ancestor listeners.
#[derive(Debug, Default)]
pub struct ClickEvent {
    propagation_stopped: bool,
}

impl ClickEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the event from reaching ancestor listeners.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Opaque reference to an affordance element in a surface's content.
///
/// Handles are tied to one content generation: replacing the content
/// invalidates every handle issued for the previous content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AffordanceHandle {
    generation: u64,
    index: usize,
}

impl AffordanceHandle {
    pub fn new(generation: u64, index: usize) -> Self {
        Self { generation, index }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Identifies one attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Affordance element found in a surface, with its raw attribute payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    pub handle: AffordanceHandle,
    pub payload: String,
}

/// Boundary through which rendered HTML enters a surface.
pub trait HtmlSink {
    /// Replaces the surface content.
    fn set_trusted_html(&mut self, html: TrustedHtml);
}

/// Live display region that copy listeners attach to.
pub trait Surface {
    /// Whether the surface is part of the visible tree.
    fn is_attached(&self) -> bool;

    /// Affordance elements in document order.
    fn affordances(&self) -> Vec<Affordance>;

    /// Attaches a click listener to an affordance.
    ///
    /// Returns `None` if the handle does not refer to current content.
    fn add_click_listener(
        &mut self,
        target: AffordanceHandle,
        listener: ClickListener,
    ) -> Option<ListenerId>;

    /// Detaches a listener. Returns whether it was attached.
    fn remove_click_listener(&mut self, target: AffordanceHandle, id: ListenerId) -> bool;
}

/// Result of dispatching a click on an [`HtmlSurface`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    pub listeners_fired: usize,
    pub reached_container: bool,
}

/// In-memory surface backed by an HTML string.
///
/// Scans its content for copy affordances (elements whose class list has
/// `copy`) and dispatches clicks to their listeners the way a browser
/// would: element listeners first, then container listeners unless
/// propagation was stopped. Replacing the content drops the listeners of
/// the removed elements.
pub struct HtmlSurface {
    html: TrustedHtml,
    attached: bool,
    generation: u64,
    payloads: Vec<String>,
    listeners: HashMap<AffordanceHandle, Vec<(ListenerId, ClickListener)>>,
    container_listeners: Vec<ClickListener>,
    next_listener: u64,
}

impl HtmlSurface {
    /// Creates detached empty surface.
    pub fn new() -> Self {
        Self {
            html: TrustedHtml::default(),
            attached: false,
            generation: 0,
            payloads: Vec::new(),
            listeners: HashMap::new(),
            container_listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn html(&self) -> &str {
        self.html.as_str()
    }

    pub fn affordance_count(&self) -> usize {
        self.payloads.len()
    }

    /// Number of listeners attached to affordance elements.
    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Adds a listener on the surface container itself.
    pub fn on_container_click(&mut self, listener: ClickListener) {
        self.container_listeners.push(listener);
    }

    /// Dispatches a click on the affordance at `index` in document order.
    pub fn click(&self, index: usize) -> ClickOutcome {
        let handle = AffordanceHandle::new(self.generation, index);
        let targets: Vec<ClickListener> = self
            .listeners
            .get(&handle)
            .map(|attached| attached.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default();

        let mut event = ClickEvent::new();
        for listener in &targets {
            listener(&mut event);
        }

        let reached_container = !event.is_propagation_stopped();
        if reached_container {
            for listener in &self.container_listeners {
                listener(&mut event);
            }
        }

        ClickOutcome {
            listeners_fired: targets.len(),
            reached_container,
        }
    }

    fn is_current(&self, handle: AffordanceHandle) -> bool {
        handle.generation == self.generation && handle.index < self.payloads.len()
    }
}

impl Default for HtmlSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlSink for HtmlSurface {
    fn set_trusted_html(&mut self, html: TrustedHtml) {
        self.payloads = scan_affordances(html.as_str());
        self.html = html;
        self.generation += 1;
        self.listeners.clear();
    }
}

impl Surface for HtmlSurface {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn affordances(&self) -> Vec<Affordance> {
        self.payloads
            .iter()
            .enumerate()
            .map(|(index, payload)| Affordance {
                handle: AffordanceHandle::new(self.generation, index),
                payload: payload.clone(),
            })
            .collect()
    }

    fn add_click_listener(
        &mut self,
        target: AffordanceHandle,
        listener: ClickListener,
    ) -> Option<ListenerId> {
        if !self.is_current(target) {
            return None;
        }

        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.entry(target).or_default().push((id, listener));

        Some(id)
    }

    fn remove_click_listener(&mut self, target: AffordanceHandle, id: ListenerId) -> bool {
        let Some(attached) = self.listeners.get_mut(&target) else {
            return false;
        };

        let before = attached.len();
        attached.retain(|(existing, _)| *existing != id);
        let removed = attached.len() != before;

        if attached.is_empty() {
            self.listeners.remove(&target);
        }

        removed
    }
}

/// Finds copy affordances in HTML and returns their raw payloads.
///
/// Walks start tags in document order; an element counts when its class
/// list contains [`COPY_CLASS`]. A missing payload attribute yields an
/// empty payload.
///
/// Only reads markup shaped like the renderer's own output: attributes
/// must be double quoted and preceded by a single space. It is not a
/// general HTML parser and must not be used on markup from elsewhere.
fn scan_affordances(html: &str) -> Vec<String> {
    let mut payloads = Vec::new();
    let mut pos = 0;

    while let Some(offset) = html[pos..].find('<') {
        let tag_start = pos + offset + 1;
        let Some(tag_len) = html[tag_start..].find('>') else {
            break;
        };
        let tag = &html[tag_start..tag_start + tag_len];
        pos = tag_start + tag_len + 1;

        if tag.starts_with('/') || tag.starts_with('!') {
            continue;
        }

        let is_affordance = attribute(tag, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == COPY_CLASS));
        if is_affordance {
            let payload = attribute(tag, CODE_ATTRIBUTE).unwrap_or_default();
            payloads.push(unescape_html(payload));
        }
    }

    payloads
}

/// Returns the value of a double quoted attribute in a start tag.
///
/// Single quoted, unquoted and newline separated attributes are not found.
fn attribute<'t>(tag: &'t str, name: &str) -> Option<&'t str> {
    let needle = format!(" {}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}
