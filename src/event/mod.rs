// Event propagation components
//
// Scene-graph nodes bubble events through their ancestors, hosts observe
// every dispatch, and subsystems publish to named-event registries.

// Public API - what other modules can use
pub use dispatcher::EventManager;
pub use events::Event;
pub use handler::{
    EventError, HandlerFn, HandlerSource, HandlerSpec, HostFn, ListenerFn, ListenerResult,
};
pub use listener::{Listener, ListenerId};
pub use target::{Bubbler, EventTarget};

// Internal modules
mod dispatcher;
mod events;
mod handler;
mod listener;
mod target;
