use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    events::Event,
    handler::{EventError, HandlerFn, HandlerSource, HandlerSpec, HostFn},
    listener::{Listener, ListenerId},
};
use crate::config::EventsConfig;

#[derive(Clone)]
struct Handler {
    id: ListenerId,
    callback: HandlerFn,
}

type HandlerRegistry = RwLock<HashMap<String, Vec<Handler>>>;

pub(crate) struct ManagerInner {
    internal: HandlerRegistry,
    external: HandlerRegistry,
    hosts: RwLock<BTreeMap<ListenerId, HostFn>>,
    next_id: AtomicU64,
    // 0 means unbounded
    max_bubble_depth: AtomicUsize,
}

impl ManagerInner {
    fn new() -> Self {
        Self {
            internal: RwLock::new(HashMap::new()),
            external: RwLock::new(HashMap::new()),
            hosts: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(0),
            max_bubble_depth: AtomicUsize::new(0),
        }
    }

    fn allocate_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn registry(&self, source: HandlerSource) -> &HandlerRegistry {
        match source {
            HandlerSource::Intern => &self.internal,
            HandlerSource::Extern => &self.external,
        }
    }

    /// Removes handler `id` from the `kind` list of `source`
    pub(crate) fn remove_handler(&self, source: HandlerSource, kind: &str, id: ListenerId) {
        let mut registry = self.registry(source).write();
        let Some(handlers) = registry.get_mut(kind) else {
            return;
        };
        let Some(pos) = handlers.iter().position(|h| h.id == id) else {
            return;
        };

        handlers.remove(pos);
        debug!(source = %source, kind = %kind, handler_id = %id, "Removed event handler");
        if handlers.is_empty() {
            registry.remove(kind);
        }
    }

    /// Removes handler `id` when only its source is known
    fn remove_handler_by_id(&self, source: HandlerSource, id: ListenerId) {
        let kind = self
            .registry(source)
            .read()
            .iter()
            .find(|(_, handlers)| handlers.iter().any(|h| h.id == id))
            .map(|(kind, _)| kind.clone());
        if let Some(kind) = kind {
            self.remove_handler(source, &kind, id);
        }
    }

    fn max_bubble_depth(&self) -> Option<usize> {
        match self.max_bubble_depth.load(Ordering::Relaxed) {
            0 => None,
            limit => Some(limit),
        }
    }

    pub(crate) fn remove_host(&self, id: ListenerId) {
        if self.hosts.write().remove(&id).is_some() {
            info!(host_id = %id, "Host deregistered");
        }
    }
}

/// Process-wide coordinator for event propagation
///
/// The EventManager:
/// - Bubbles events from their origin through each ancestor's listeners
/// - Notifies every registered host of each dispatched event
/// - Keeps the `intern` and `extern` named-event registries
/// - Hands out ids from one counter shared by hosts and both registries
///
/// Clones share all registries and settings, so one manager is created per
/// application and handed to every target and subsystem.
#[derive(Clone)]
pub struct EventManager {
    inner: Arc<ManagerInner>,
}

impl EventManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ManagerInner::new()),
        }
    }

    pub fn with_config(config: &EventsConfig) -> Self {
        let manager = Self::new();
        manager.set_max_bubble_depth(config.max_bubble_depth);
        manager
    }

    /// Fail a dispatch that visits more than `limit` nodes instead of
    /// looping forever on an accidental parent cycle
    pub fn with_max_bubble_depth(self, limit: usize) -> Self {
        self.set_max_bubble_depth(Some(limit));
        self
    }

    /// Applies to every clone of this manager, including the ones already
    /// held by targets. `None` or `Some(0)` removes the limit.
    pub fn set_max_bubble_depth(&self, limit: Option<usize>) {
        self.inner
            .max_bubble_depth
            .store(limit.unwrap_or(0), Ordering::Relaxed);
        debug!(max_bubble_depth = ?limit, "Bubble depth limit updated");
    }

    pub fn max_bubble_depth(&self) -> Option<usize> {
        self.inner.max_bubble_depth()
    }

    /// Registers a named-event handler; `source` must be `intern` or `extern`
    pub fn add_event_handler<F>(
        &self,
        source: &str,
        kind: impl Into<String>,
        callback: F,
    ) -> Result<Listener, EventError>
    where
        F: Fn(&Value) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let source = HandlerSource::parse(source)?;
        Ok(self.on(source, kind, callback))
    }

    /// Typed form of `add_event_handler`
    pub fn on<F>(&self, source: HandlerSource, kind: impl Into<String>, callback: F) -> Listener
    where
        F: Fn(&Value) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.insert_handler(source, kind.into(), Arc::new(callback))
    }

    fn insert_handler(&self, source: HandlerSource, kind: String, callback: HandlerFn) -> Listener {
        let id = self.inner.allocate_id();
        debug!(source = %source, kind = %kind, handler_id = %id, "Registering event handler");

        self.inner
            .registry(source)
            .write()
            .entry(kind.clone())
            .or_default()
            .push(Handler { id, callback });

        Listener::handler(id, Arc::downgrade(&self.inner), source, kind)
    }

    /// Registers a batch of handlers, keyed by kind in the result
    ///
    /// Every source is validated before anything is registered. When two
    /// specs share a kind both are registered and the later handle wins the
    /// map slot.
    pub fn add_event_handlers(
        &self,
        specs: impl IntoIterator<Item = HandlerSpec>,
    ) -> Result<HashMap<String, Listener>, EventError> {
        let parsed = specs
            .into_iter()
            .map(|spec| HandlerSource::parse(&spec.source).map(|source| (source, spec)))
            .collect::<Result<Vec<_>, EventError>>()?;

        Ok(parsed
            .into_iter()
            .map(|(source, spec)| {
                let listener = self.insert_handler(source, spec.kind.clone(), spec.callback);
                (spec.kind, listener)
            })
            .collect())
    }

    /// Removes a handler by id. Unknown ids are a no-op, unknown sources fail.
    pub fn remove_event_handler(&self, source: &str, id: ListenerId) -> Result<(), EventError> {
        let source = HandlerSource::parse(source)?;
        self.inner.remove_handler_by_id(source, id);
        Ok(())
    }

    pub fn handler_count(&self, source: HandlerSource, kind: &str) -> usize {
        self.inner
            .registry(source)
            .read()
            .get(kind)
            .map_or(0, Vec::len)
    }

    /// Registers a callback that observes every non-suppressed dispatch
    pub fn register_host<F>(&self, callback: F) -> Listener
    where
        F: Fn(&Event) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let id = self.inner.allocate_id();
        self.inner.hosts.write().insert(id, Arc::new(callback));
        info!(host_id = %id, "Host registered");
        Listener::host(id, Arc::downgrade(&self.inner))
    }

    pub fn host_count(&self) -> usize {
        self.inner.hosts.read().len()
    }

    /// Publishes to the `intern` handlers of `kind`
    pub fn handle_internal_event(&self, kind: &str, payload: &Value) -> Result<(), EventError> {
        self.publish(HandlerSource::Intern, kind, payload)
    }

    /// Publishes to the `extern` handlers of `kind`
    pub fn handle_external_event(&self, kind: &str, payload: &Value) -> Result<(), EventError> {
        self.publish(HandlerSource::Extern, kind, payload)
    }

    #[instrument(skip(self, payload))]
    fn publish(&self, source: HandlerSource, kind: &str, payload: &Value) -> Result<(), EventError> {
        let handlers: Vec<HandlerFn> = self
            .inner
            .registry(source)
            .read()
            .get(kind)
            .map(|handlers| handlers.iter().map(|h| h.callback.clone()).collect())
            .unwrap_or_default();

        debug!(handlers = handlers.len(), "Publishing event");

        for handler in handlers {
            handler(payload)?;
        }
        Ok(())
    }

    /// Bubbles `event` from its cursor to the root, then notifies hosts and
    /// internal handlers unless a listener suppressed them
    ///
    /// Returns the event as it left the hierarchy, which may be a replacement
    /// produced by a listener. The first callback error aborts the dispatch.
    #[instrument(skip(self, event), fields(kind = %event.kind(), domain = %event.domain()))]
    pub fn dispatch_event(&self, event: Event) -> Result<Event, EventError> {
        let max_depth = self.inner.max_bubble_depth();
        let mut current = event;
        let mut visited = 0usize;

        while let Some(node) = current.cursor.clone() {
            if current.is_stopped() {
                debug!(visited, "Bubbling stopped");
                break;
            }
            if let Some(limit) = max_depth {
                if visited >= limit {
                    warn!(limit, "Bubble depth exceeded, aborting dispatch");
                    return Err(EventError::DepthExceeded { limit });
                }
            }

            let next = node.handle_event(current)?;
            let parent = node.parent();
            current = next;
            current.cursor = parent;
            visited += 1;
        }

        if current.is_host_suppressed() {
            debug!(visited, "Host notification suppressed");
            return Ok(current);
        }

        let hosts: Vec<HostFn> = self.inner.hosts.read().values().cloned().collect();
        debug!(visited, hosts = hosts.len(), "Notifying hosts");
        for host in hosts {
            host(&current)?;
        }

        self.handle_internal_event(current.kind(), current.payload())?;
        Ok(current)
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}
