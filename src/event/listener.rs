use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Weak;

use super::dispatcher::ManagerInner;
use super::handler::HandlerSource;
use super::target::TargetInner;

/// Identifier handed out on registration
///
/// Node-local listener ids are private to their target and start at 0.
/// Handler and host ids come from the manager's shared counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone)]
enum Registration {
    Local(Weak<TargetInner>),
    Handler {
        manager: Weak<ManagerInner>,
        source: HandlerSource,
        kind: String,
    },
    Host(Weak<ManagerInner>),
}

/// Handle returned by every registration call
///
/// Dropping the handle does not deregister anything; call `cancel`.
/// Handles only hold weak references, so they never keep a target or
/// manager alive.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    registration: Registration,
}

impl Listener {
    pub(crate) fn local(id: ListenerId, target: Weak<TargetInner>) -> Self {
        Self {
            id,
            registration: Registration::Local(target),
        }
    }

    pub(crate) fn handler(
        id: ListenerId,
        manager: Weak<ManagerInner>,
        source: HandlerSource,
        kind: String,
    ) -> Self {
        Self {
            id,
            registration: Registration::Handler {
                manager,
                source,
                kind,
            },
        }
    }

    pub(crate) fn host(id: ListenerId, manager: Weak<ManagerInner>) -> Self {
        Self {
            id,
            registration: Registration::Host(manager),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Removes the registration. Idempotent, and a no-op once the owning
    /// target or manager is gone.
    pub fn cancel(&self) {
        match &self.registration {
            Registration::Local(target) => {
                if let Some(target) = target.upgrade() {
                    target.remove_listener(self.id);
                }
            }
            Registration::Handler {
                manager,
                source,
                kind,
            } => {
                if let Some(manager) = manager.upgrade() {
                    manager.remove_handler(*source, kind, self.id);
                }
            }
            Registration::Host(manager) => {
                if let Some(manager) = manager.upgrade() {
                    manager.remove_host(self.id);
                }
            }
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = match &self.registration {
            Registration::Local(_) => "local".to_string(),
            Registration::Handler { source, kind, .. } => format!("{source}:{kind}"),
            Registration::Host(_) => "host".to_string(),
        };
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("registry", &registry)
            .finish()
    }
}
