/// Engine instance registry
///
/// An explicit, injectable registry of live engine instances replacing the
/// usual ambient "list of engines" global. Hosts that need "last created
/// engine" lookups construct one registry, hand an `Arc` of it to each
/// engine they create, and tear it down with the engines. Tests instantiate
/// isolated registries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::{engine_debug, engine_warn};

const SOURCE: &str = "stellar3d::EngineRegistry";

/// Identity of one registered engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineInstanceId(u64);

#[derive(Debug, Clone)]
struct InstanceEntry {
    id: EngineInstanceId,
    label: String,
}

/// Registry of live engine instances
#[derive(Debug, Default)]
pub struct EngineRegistry {
    next_id: AtomicU64,
    instances: Mutex<Vec<InstanceEntry>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            instances: Mutex::new(Vec::new()),
        }
    }

    /// Register a live instance; called by the engine constructor
    pub fn register(&self, label: &str) -> EngineInstanceId {
        let id = EngineInstanceId(self.next_id.fetch_add(1, Ordering::SeqCst));
        if let Ok(mut instances) = self.instances.lock() {
            instances.push(InstanceEntry {
                id,
                label: label.to_string(),
            });
        }
        engine_debug!(SOURCE, "Registered engine instance '{}'", label);
        id
    }

    /// Remove an instance; called on engine disposal
    pub fn unregister(&self, id: EngineInstanceId) {
        if let Ok(mut instances) = self.instances.lock() {
            let before = instances.len();
            instances.retain(|entry| entry.id != id);
            if instances.len() == before {
                engine_warn!(SOURCE, "Unregister of unknown engine instance {:?}", id);
            }
        }
    }

    /// Identity of the most recently created live instance
    pub fn last_created(&self) -> Option<EngineInstanceId> {
        self.instances
            .lock()
            .ok()
            .and_then(|instances| instances.last().map(|entry| entry.id))
    }

    /// Label of a live instance
    pub fn label_of(&self, id: EngineInstanceId) -> Option<String> {
        self.instances.lock().ok().and_then(|instances| {
            instances
                .iter()
                .find(|entry| entry.id == id)
                .map(|entry| entry.label.clone())
        })
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.instances.lock().map(|i| i.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
