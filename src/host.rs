use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, instrument};

use crate::event::{Event, EventError, EventManager, HandlerSource, Listener};

/// Snapshot of a dispatched event as the embedding application sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostMessage {
    pub kind: String,
    /// Label of the node the event originated at, if it had one
    pub origin: Option<String>,
    pub payload: Value,
}

impl HostMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&Event> for HostMessage {
    fn from(event: &Event) -> Self {
        Self {
            kind: event.kind().to_string(),
            origin: event.origin().label().map(str::to_string),
            payload: event.payload().clone(),
        }
    }
}

/// Surface the embedding application talks to
///
/// `publish` injects host commands into the `extern` registry, `subscribe`
/// listens on the `intern` registry, and hosts observe every dispatch.
#[derive(Clone)]
pub struct HostApi {
    manager: EventManager,
}

impl HostApi {
    pub fn new(manager: EventManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &EventManager {
        &self.manager
    }

    pub fn register_host<F>(&self, callback: F) -> Listener
    where
        F: Fn(&Event) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.manager.register_host(callback)
    }

    #[instrument(skip(self, payload))]
    pub fn publish(&self, kind: &str, payload: Value) -> Result<(), EventError> {
        self.manager.handle_external_event(kind, &payload)
    }

    pub fn subscribe<F>(&self, kind: impl Into<String>, callback: F) -> Listener
    where
        F: Fn(&Value) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.manager.on(HandlerSource::Intern, kind, callback)
    }

    /// Registers a host that forwards every observed event into a channel
    ///
    /// Cancelling the returned listener drops the sender and closes the
    /// receiver. Dropping the receiver first makes later dispatches fail with
    /// `EventError::HostClosed`.
    pub fn attach_channel(&self) -> (Listener, mpsc::UnboundedReceiver<HostMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let listener = self.manager.register_host(move |event| {
            sender
                .send(HostMessage::from(event))
                .map_err(|_| EventError::HostClosed)
        });
        info!(host_id = %listener.id(), "Channel host attached");
        (listener, receiver)
    }
}
