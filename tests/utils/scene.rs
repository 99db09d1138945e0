use geoscene::{Bubbler, EventManager, EventTarget};

// ============================================================================
// Scene Fixtures
// ============================================================================

/// Stand-in for a scene entity that composes an event target
pub struct TestEntity {
    target: EventTarget,
}

impl TestEntity {
    pub fn new(name: &str, manager: &EventManager, parent: Option<&TestEntity>) -> Self {
        Self {
            target: EventTarget::named(name, Some(manager.clone()), parent.map(|p| &p.target)),
        }
    }
}

impl Bubbler for TestEntity {
    fn event_target(&self) -> &EventTarget {
        &self.target
    }
}

/// origin -> parent -> grandparent, all sharing one manager
pub struct Chain {
    pub manager: EventManager,
    pub grandparent: TestEntity,
    pub parent: TestEntity,
    pub origin: TestEntity,
}

impl Chain {
    pub fn new() -> Self {
        Self::with_manager(EventManager::new())
    }

    pub fn with_manager(manager: EventManager) -> Self {
        let grandparent = TestEntity::new("grandparent", &manager, None);
        let parent = TestEntity::new("parent", &manager, Some(&grandparent));
        let origin = TestEntity::new("origin", &manager, Some(&parent));
        Self {
            manager,
            grandparent,
            parent,
            origin,
        }
    }
}
