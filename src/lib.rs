// Library crate for the geoscene event subsystem
// This file exposes the public API for integration tests and embedders

pub mod config;
pub mod event;
pub mod host;

// Re-export commonly used types for easier access in tests
pub use config::{ConfigError, EventsConfig};
pub use event::{
    Bubbler, Event, EventError, EventManager, EventTarget, HandlerSource, HandlerSpec, Listener,
    ListenerId,
};
pub use host::{HostApi, HostMessage};
