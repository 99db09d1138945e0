use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

use super::dispatcher::EventManager;
use super::events::Event;
use super::handler::{EventError, ListenerFn, ListenerResult};
use super::listener::{Listener, ListenerId};

#[derive(Clone)]
struct LocalListener {
    kind: String,
    callback: ListenerFn,
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    // ids only grow, so key order is insertion order
    entries: BTreeMap<ListenerId, LocalListener>,
}

pub(crate) struct TargetInner {
    label: Option<String>,
    manager: RwLock<Option<EventManager>>,
    parent: RwLock<Option<Weak<TargetInner>>>,
    listeners: RwLock<ListenerTable>,
}

impl TargetInner {
    pub(crate) fn remove_listener(&self, id: ListenerId) {
        if self.listeners.write().entries.remove(&id).is_some() {
            debug!(target_label = ?self.label, listener_id = %id, "Removed event listener");
        }
    }
}

/// A node in the bubbling hierarchy
///
/// Cheap to clone: clones share the same listener table and parent link.
/// The parent is held weakly, so a child never keeps its ancestors alive.
/// Nothing checks for cycles; a target must never become its own ancestor.
#[derive(Clone)]
pub struct EventTarget {
    inner: Arc<TargetInner>,
}

impl EventTarget {
    pub fn new(manager: Option<EventManager>, parent: Option<&EventTarget>) -> Self {
        Self::build(None, manager, parent)
    }

    /// Like `new`, with a label that shows up in logs and `Debug` output
    pub fn named(
        label: impl Into<String>,
        manager: Option<EventManager>,
        parent: Option<&EventTarget>,
    ) -> Self {
        Self::build(Some(label.into()), manager, parent)
    }

    fn build(label: Option<String>, manager: Option<EventManager>, parent: Option<&EventTarget>) -> Self {
        Self {
            inner: Arc::new(TargetInner {
                label,
                manager: RwLock::new(manager),
                parent: RwLock::new(parent.map(|p| Arc::downgrade(&p.inner))),
                listeners: RwLock::new(ListenerTable::default()),
            }),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    /// Whether both handles refer to the same node
    pub fn ptr_eq(&self, other: &EventTarget) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn manager(&self) -> Option<EventManager> {
        self.inner.manager.read().clone()
    }

    /// Moves the target to another manager, or detaches it with `None`
    pub fn set_manager(&self, manager: Option<EventManager>) {
        *self.inner.manager.write() = manager;
    }

    /// The parent node, if one is set and still alive
    pub fn parent(&self) -> Option<EventTarget> {
        self.inner
            .parent
            .read()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| EventTarget { inner })
    }

    pub fn set_parent(&self, parent: Option<&EventTarget>) {
        *self.inner.parent.write() = parent.map(|p| Arc::downgrade(&p.inner));
    }

    /// Registers a listener for events of `kind` reaching this node.
    /// Listeners run in registration order.
    pub fn add_event_listener<F>(&self, kind: impl Into<String>, callback: F) -> Listener
    where
        F: Fn(&mut Event) -> ListenerResult + Send + Sync + 'static,
    {
        let kind = kind.into();
        let mut table = self.inner.listeners.write();
        let id = ListenerId(table.next_id);
        table.next_id += 1;

        debug!(target_label = ?self.inner.label, listener_id = %id, kind = %kind, "Added event listener");

        table.entries.insert(
            id,
            LocalListener {
                kind,
                callback: Arc::new(callback),
            },
        );

        Listener::local(id, Arc::downgrade(&self.inner))
    }

    /// No-op if `id` is not registered here
    pub fn remove_event_listener(&self, id: ListenerId) {
        self.inner.remove_listener(id);
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().entries.len()
    }

    /// Runs this node's listeners against `event`
    ///
    /// The table is snapshotted first: listeners added or cancelled by a
    /// callback take effect from the next node. A listener returning
    /// `Some(replacement)` swaps the event for the rest of this node, and the
    /// replacement is what gets returned.
    pub fn handle_event(&self, event: Event) -> Result<Event, EventError> {
        let snapshot: Vec<LocalListener> = self
            .inner
            .listeners
            .read()
            .entries
            .values()
            .cloned()
            .collect();

        let mut current = event;
        for listener in snapshot {
            if listener.kind != current.kind() {
                continue;
            }
            if let Some(replacement) = (listener.callback)(&mut current)? {
                current = replacement;
            }
        }

        Ok(current)
    }

    /// Hands the event to the attached manager for bubbling
    pub fn dispatch_event(&self, event: Event) -> Result<Event, EventError> {
        let manager = self.manager().ok_or(EventError::Detached)?;
        manager.dispatch_event(event)
    }

    /// Builds an event originating here and dispatches it
    pub fn emit(&self, kind: impl Into<String>, payload: Value) -> Result<Event, EventError> {
        self.dispatch_event(Event::new(self, kind, payload))
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("label", &self.inner.label)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Capability of taking part in event bubbling
///
/// Scene entities compose an `EventTarget` and expose it here; the provided
/// methods delegate to it.
pub trait Bubbler {
    fn event_target(&self) -> &EventTarget;

    fn add_event_listener<F>(&self, kind: impl Into<String>, callback: F) -> Listener
    where
        F: Fn(&mut Event) -> ListenerResult + Send + Sync + 'static,
        Self: Sized,
    {
        self.event_target().add_event_listener(kind, callback)
    }

    fn remove_event_listener(&self, id: ListenerId) {
        self.event_target().remove_event_listener(id);
    }

    fn dispatch_event(&self, event: Event) -> Result<Event, EventError> {
        self.event_target().dispatch_event(event)
    }

    fn emit(&self, kind: impl Into<String>, payload: Value) -> Result<Event, EventError>
    where
        Self: Sized,
    {
        self.event_target().emit(kind, payload)
    }

    fn parent(&self) -> Option<EventTarget> {
        self.event_target().parent()
    }

    fn set_parent(&self, parent: Option<&EventTarget>) {
        self.event_target().set_parent(parent);
    }
}

impl Bubbler for EventTarget {
    fn event_target(&self) -> &EventTarget {
        self
    }
}
