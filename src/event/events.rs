use serde_json::Value;

use super::target::EventTarget;

/// One occurrence travelling through the scene graph
///
/// Everything except the cursor and the two cancellation flags is fixed at
/// construction. Kinds are `/`-separated by convention (`entity/select`,
/// `input/leftdown`) but never validated.
#[derive(Debug, Clone)]
pub struct Event {
    kind: String,
    origin: EventTarget,
    pub(crate) cursor: Option<EventTarget>,
    payload: Value,
    stopped: bool,
    stop_host: bool,
}

impl Event {
    pub fn new(origin: &EventTarget, kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            origin: origin.clone(),
            cursor: Some(origin.clone()),
            payload,
            stopped: false,
            stop_host: false,
        }
    }

    /// Stops bubbling. With `suppress_host` the hosts and internal handlers
    /// are skipped as well.
    pub fn cancel(&mut self, suppress_host: bool) {
        self.stopped = true;
        if suppress_host {
            self.stop_host = true;
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// First segment of the kind, `entity` for `entity/select`
    pub fn domain(&self) -> &str {
        self.kind.split('/').next().unwrap_or_default()
    }

    pub fn origin(&self) -> &EventTarget {
        &self.origin
    }

    /// Node currently processing the event; `None` once the root was passed
    pub fn cursor(&self) -> Option<&EventTarget> {
        self.cursor.as_ref()
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut Value {
        &mut self.payload
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_host_suppressed(&self) -> bool {
        self.stop_host
    }
}
