//! Unit tests for registry.rs

use crate::registry::EngineRegistry;

#[test]
fn test_empty_registry() {
    let registry = EngineRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.last_created().is_none());
}

#[test]
fn test_register_and_lookup() {
    let registry = EngineRegistry::new();
    let id = registry.register("main");

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.last_created(), Some(id));
    assert_eq!(registry.label_of(id).as_deref(), Some("main"));
}

#[test]
fn test_last_created_tracks_registration_order() {
    let registry = EngineRegistry::new();
    let first = registry.register("first");
    let second = registry.register("second");

    assert_eq!(registry.last_created(), Some(second));

    registry.unregister(second);
    assert_eq!(registry.last_created(), Some(first));
}

#[test]
fn test_unregister_removes_instance() {
    let registry = EngineRegistry::new();
    let id = registry.register("main");
    registry.unregister(id);

    assert!(registry.is_empty());
    assert!(registry.label_of(id).is_none());
}

#[test]
fn test_unregister_unknown_is_harmless() {
    let registry = EngineRegistry::new();
    let id = registry.register("main");
    registry.unregister(id);
    // Double unregister only warns
    registry.unregister(id);
    assert!(registry.is_empty());
}

#[test]
fn test_isolated_registries() {
    let a = EngineRegistry::new();
    let b = EngineRegistry::new();
    a.register("in_a");

    assert_eq!(a.len(), 1);
    assert!(b.is_empty());
}
