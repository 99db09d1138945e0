use serde_json::Value;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use thiserror::Error;

use super::events::Event;

/// Errors that can occur while registering or dispatching events
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("invalid handler source '{0}', expected one of: intern, extern")]
    InvalidSource(String),

    #[error("event target has no event manager attached")]
    Detached,

    #[error("event bubbled past the maximum depth of {limit} nodes")]
    DepthExceeded { limit: usize },

    #[error("handler failed: {0}")]
    Handler(String),

    #[error("host channel closed")]
    HostClosed,
}

impl EventError {
    /// Create an error raised from inside a listener, host or handler callback
    pub fn handler(msg: impl Into<String>) -> Self {
        EventError::Handler(msg.into())
    }

    pub fn invalid_source(source: impl Into<String>) -> Self {
        EventError::InvalidSource(source.into())
    }
}

/// Which named-event registry a handler belongs to
///
/// `Intern` events are published from within the system (e.g. `entity/select`),
/// `Extern` events are injected by the embedding application (e.g.
/// `entity/bulk/show`). Both share one kind namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum HandlerSource {
    Intern,
    Extern,
}

impl HandlerSource {
    /// Parse the string form used by the registration API
    pub fn parse(source: &str) -> Result<Self, EventError> {
        source
            .parse()
            .map_err(|_| EventError::invalid_source(source))
    }
}

/// Outcome of a node-local listener: `Some(event)` replaces the propagating event
pub type ListenerResult = Result<Option<Event>, EventError>;

pub type ListenerFn = Arc<dyn Fn(&mut Event) -> ListenerResult + Send + Sync>;

pub type HostFn = Arc<dyn Fn(&Event) -> Result<(), EventError> + Send + Sync>;

pub type HandlerFn = Arc<dyn Fn(&Value) -> Result<(), EventError> + Send + Sync>;

/// One entry of a batch registration, see `EventManager::add_event_handlers`
pub struct HandlerSpec {
    pub source: String,
    pub kind: String,
    pub callback: HandlerFn,
}

impl HandlerSpec {
    pub fn new<F>(source: impl Into<String>, kind: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Value) -> Result<(), EventError> + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            kind: kind.into(),
            callback: Arc::new(callback),
        }
    }
}
