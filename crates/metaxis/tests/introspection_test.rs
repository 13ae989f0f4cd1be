//! Introspection API tests
//!
//! Tests for runtime introspection functionality:
//! - Hierarchy traversal
//! - Method enumeration and providers
//! - Subclass enumeration within a factory
//! - Object queries
//!
//! Run with: `cargo test --test introspection_test`

mod common;

use common::{AbstractClass, Interface, PreObject, TestObject};
use metaxis::runtime::{MetaClass, MetaObject, Object, ObjectFactory, introspection::*};

// ============================================================================
// Hierarchy Traversal Tests
// ============================================================================

#[test]
fn test_class_hierarchy_multiple_inheritance() {
    let hierarchy = class_hierarchy(TestObject::static_meta_class());
    let names: Vec<&str> = hierarchy.iter().map(|class| class.name()).collect();

    // Depth-first through the first base before the second.
    assert_eq!(
        names,
        vec!["Object", "PreObject", "AbstractClass", "meta.MetaObject", "Interface"]
    );
}

#[test]
fn test_is_subclass() {
    let object = TestObject::static_meta_class();
    assert!(is_subclass(object, AbstractClass::static_meta_class()));
    assert!(is_subclass(object, Interface::static_meta_class()));
    assert!(!is_subclass(Interface::static_meta_class(), object));
    assert!(!is_subclass(
        PreObject::static_meta_class(),
        Interface::static_meta_class()
    ));
}

// ============================================================================
// Method Enumeration Tests
// ============================================================================

#[test]
fn test_all_methods_include_inherited() {
    let methods = all_methods(TestObject::static_meta_class());
    let mut names: Vec<&str> = methods.iter().map(|m| m.name()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Object.func", "getName"]);
}

#[test]
fn test_method_provider() {
    let class = TestObject::static_meta_class();
    assert_eq!(method_provider(class, "Object.func"), Some(class));
    assert_eq!(
        method_provider(class, "getName"),
        Some(<dyn MetaObject>::static_meta_class())
    );
    assert!(!has_method(Interface::static_meta_class(), "getName"));
}

// ============================================================================
// Factory & Object Tests
// ============================================================================

#[test]
fn test_subclasses_of_root() {
    let factory = ObjectFactory::new();
    factory.register(TestObject::static_meta_class()).unwrap();
    factory.register(Object::static_meta_class()).unwrap();

    let names: Vec<&str> = subclasses(&factory, <dyn MetaObject>::static_meta_class())
        .iter()
        .map(|class| class.name())
        .collect();
    assert_eq!(names, vec!["AbstractClass", "PreObject", "Object", "meta.Object"]);
}

#[test]
fn test_object_queries() {
    let object = TestObject::static_meta_class().create("sample").unwrap();

    assert!(is_instance(object.as_ref(), PreObject::static_meta_class()));
    assert!(!is_instance(object.as_ref(), Object::static_meta_class()));
    assert!(responds_to(object.as_ref(), "Object.func"));
    assert!(responds_to(object.as_ref(), "getName"));
    assert!(!responds_to(object.as_ref(), "text"));
}
