//! Course library application: authors, their courses, and author collections.

pub mod modules;

use std::sync::Arc;

use courselib_db::InMemoryStore;
use courselib_kernel::ModuleRegistry;

pub use modules::{register_all, SharedStore};

/// Registry with every module registered against `store`
pub fn build_registry(store: SharedStore) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, store);
    registry
}

/// Fresh in-memory store behind the shared handle
pub fn in_memory_store() -> SharedStore {
    Arc::new(InMemoryStore::new())
}
