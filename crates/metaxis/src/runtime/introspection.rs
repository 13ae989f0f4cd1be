//! Runtime introspection over classes, registries and objects.
//!
//! This module provides read-only queries on top of the class graph:
//!
//! - **Hierarchy** - ancestry listing and subclass checks
//! - **Methods** - callables reachable from a class and who provides them
//! - **Registries** - subclasses of a class among a factory's entries
//! - **Objects** - class membership and dispatchability by name
//!
//! # Example
//!
//! ```rust
//! use metaxis::runtime::introspection::*;
//! use metaxis::runtime::{MetaClass, MetaObject, Object};
//!
//! let class = Object::static_meta_class();
//! let hierarchy = class_hierarchy(class);
//! assert_eq!(hierarchy.len(), 2);
//!
//! let provider = method_provider(class, "getName").unwrap();
//! assert_eq!(provider, <dyn MetaObject>::static_meta_class());
//! ```

use crate::runtime::{Callable, ClassHandle, MetaObject, ObjectFactory};
use std::sync::Arc;

// ============================================================================
// Hierarchy
// ============================================================================

/// Returns `class` followed by its transitive bases, depth-first in
/// declaration order, each class once.
#[must_use]
pub fn class_hierarchy(class: ClassHandle) -> Vec<ClassHandle> {
    class.ancestors()
}

/// Returns true if `child` is `parent` or derives from it.
#[must_use]
pub fn is_subclass(child: ClassHandle, parent: ClassHandle) -> bool {
    child.has_ancestor(parent)
}

/// Registered classes that derive from `parent`, excluding `parent` itself,
/// in registration order.
#[must_use]
pub fn subclasses(factory: &ObjectFactory, parent: ClassHandle) -> Vec<ClassHandle> {
    factory
        .iter()
        .into_iter()
        .map(|(_, class)| class)
        .filter(|class| *class != parent && is_subclass(*class, parent))
        .collect()
}

// ============================================================================
// Methods
// ============================================================================

/// Every callable reachable from `class`, most-derived definition first.
#[must_use]
pub fn all_methods(class: ClassHandle) -> Vec<Arc<Callable>> {
    class.methods()
}

/// Returns true if `class` or one of its ancestors defines `name`.
#[must_use]
pub fn has_method(class: ClassHandle, name: &str) -> bool {
    method_provider(class, name).is_some()
}

/// The class whose definition of `name` a lookup from `class` would use.
#[must_use]
pub fn method_provider(class: ClassHandle, name: &str) -> Option<ClassHandle> {
    class
        .find_callable_in_ancestry(name)
        .map(|(provider, _)| provider)
}

// ============================================================================
// Objects
// ============================================================================

/// Returns true if `object` is an instance of `class` or of a subclass.
#[must_use]
pub fn is_instance(object: &dyn MetaObject, class: ClassHandle) -> bool {
    class.is_meta_class_of(object)
}

/// Returns true if invoking `name` on `object` would find an extension.
#[must_use]
pub fn responds_to(object: &dyn MetaObject, name: &str) -> bool {
    object
        .as_object()
        .is_some_and(|base| base.find_extension(name).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Argument, ClassBuilder, MetaClass, Object, ObjectExtension};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_ID: AtomicUsize = AtomicUsize::new(0);

    fn unique(prefix: &str) -> String {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        format!("IntrospectionTest.{prefix}_{id}")
    }

    #[test]
    fn test_class_hierarchy_starts_with_self() {
        let parent = ClassBuilder::new(unique("Parent")).build();
        let child = ClassBuilder::new(unique("Child")).base(parent).build();

        assert_eq!(class_hierarchy(child), vec![child, parent]);
        assert!(is_subclass(child, parent));
        assert!(is_subclass(child, child));
        assert!(!is_subclass(parent, child));
    }

    #[test]
    fn test_method_provider_prefers_most_derived() {
        let parent = ClassBuilder::new(unique("Parent"))
            .callable(Callable::new("speak", |_| Ok(Argument::void())))
            .callable(Callable::new("sleep", |_| Ok(Argument::void())))
            .build();
        let child = ClassBuilder::new(unique("Child"))
            .base(parent)
            .callable(Callable::new("speak", |_| Ok(Argument::void())))
            .build();

        assert_eq!(method_provider(child, "speak"), Some(child));
        assert_eq!(method_provider(child, "sleep"), Some(parent));
        assert_eq!(method_provider(child, "fly"), None);
        assert!(has_method(child, "sleep"));
        assert_eq!(all_methods(child).len(), 2);
    }

    #[test]
    fn test_subclasses_in_factory() {
        let factory = ObjectFactory::new();
        let parent = ClassBuilder::new(unique("Parent")).build();
        let first = ClassBuilder::new(unique("First")).base(parent).build();
        let second = ClassBuilder::new(unique("Second")).base(first).build();
        let unrelated = ClassBuilder::new(unique("Unrelated")).build();

        factory.register(second).unwrap();
        factory.register(unrelated).unwrap();

        assert_eq!(subclasses(&factory, parent), vec![first, second]);
        assert!(subclasses(&factory, second).is_empty());
    }

    #[test]
    fn test_object_queries() {
        let object = Object::static_meta_class().create("sample").unwrap();

        assert!(is_instance(object.as_ref(), <dyn MetaObject>::static_meta_class()));
        assert!(responds_to(object.as_ref(), "getName"));
        assert!(!responds_to(object.as_ref(), "fly"));

        let base = object.as_object().unwrap();
        base.add_extension(&ObjectExtension::new("fly", |_| Ok(Argument::void())))
            .unwrap();
        assert!(responds_to(object.as_ref(), "fly"));
    }
}
