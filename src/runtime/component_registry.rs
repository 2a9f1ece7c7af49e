//! Component registry and identifiers.

use std::collections::BTreeMap;

use crate::core::component::Component;

/// Identifier for a component owned by one `TuiRuntime`.
///
/// Unique within the runtime and never reused.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ComponentId(u64);

#[derive(Default)]
pub struct ComponentRegistry {
    entries: BTreeMap<ComponentId, Box<dyn Component>>,
    next_id: u64,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_boxed(&mut self, component: Box<dyn Component>) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, component);
        id
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut Box<dyn Component>> {
        self.entries.get_mut(&id)
    }
}
