use parking_lot::Mutex;
use std::sync::Arc;

use geoscene::{Event, EventError, EventManager, EventTarget, HandlerSource, Listener};

// ============================================================================
// Call Recorder
// ============================================================================

/// Shared, ordered log of which callbacks ran
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.calls.lock().push(entry.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == entry).count()
    }

    /// Listener on `target` that records `name` and lets the event continue
    pub fn listen(&self, target: &EventTarget, kind: &str, name: &str) -> Listener {
        let log = self.clone();
        let name = name.to_string();
        target.add_event_listener(kind, move |_| {
            log.record(name.clone());
            Ok(None)
        })
    }

    /// Listener on `target` that records `name` then cancels the event
    pub fn listen_and_cancel(
        &self,
        target: &EventTarget,
        kind: &str,
        name: &str,
        suppress_host: bool,
    ) -> Listener {
        let log = self.clone();
        let name = name.to_string();
        target.add_event_listener(kind, move |event: &mut Event| {
            log.record(name.clone());
            event.cancel(suppress_host);
            Ok(None)
        })
    }

    pub fn host(&self, manager: &EventManager, name: &str) -> Listener {
        let log = self.clone();
        let name = name.to_string();
        manager.register_host(move |_| {
            log.record(name.clone());
            Ok(())
        })
    }

    pub fn handler(
        &self,
        manager: &EventManager,
        source: HandlerSource,
        kind: &str,
        name: &str,
    ) -> Listener {
        let log = self.clone();
        let name = name.to_string();
        manager.on(source, kind, move |_| {
            log.record(name.clone());
            Ok(())
        })
    }

    /// Handler that fails with `EventError::Handler(name)`
    pub fn failing_handler(&self, manager: &EventManager, kind: &str, name: &str) -> Listener {
        let log = self.clone();
        let name = name.to_string();
        manager.on(HandlerSource::Intern, kind, move |_| {
            log.record(name.clone());
            Err(EventError::handler(name.clone()))
        })
    }
}
