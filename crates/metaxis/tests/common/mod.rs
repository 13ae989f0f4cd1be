// Common test utilities for integration tests
//
// This module provides the fixture class hierarchy and shared helpers
// for use across all integration tests.
//
//   meta.MetaObject     Interface
//          |            /       \
//    AbstractClass     /    "AbstractClass" (OverrideClass)
//          |          /
//      PreObject     /
//           \       /
//           "Object" (TestObject)

#![allow(dead_code)]

use metaxis::runtime::{
    Argument, Callable, ClassBuilder, ClassHandle, MetaClass, MetaObject,
    Object,
};
use metaxis_log::{CapturePrinter, PrinterId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

static TEST_ID: AtomicUsize = AtomicUsize::new(0);

/// Returns a class name no other test in this binary uses.
pub fn unique_name(prefix: &str) -> String {
    let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}_{id}")
}

/// Abstract class deriving from the root.
pub struct AbstractClass;

impl MetaClass for AbstractClass {
    fn static_meta_class() -> ClassHandle {
        static CLASS: OnceLock<ClassHandle> = OnceLock::new();
        *CLASS.get_or_init(|| {
            ClassBuilder::new("AbstractClass")
                .base(<dyn MetaObject>::static_meta_class())
                .build()
        })
    }
}

/// Abstract class with no bases.
pub struct Interface;

impl MetaClass for Interface {
    fn static_meta_class() -> ClassHandle {
        static CLASS: OnceLock<ClassHandle> = OnceLock::new();
        *CLASS.get_or_init(|| ClassBuilder::new("Interface").build())
    }
}

/// Registers under `AbstractClass`'s name with an extra `Interface` base.
pub struct OverrideClass;

impl MetaClass for OverrideClass {
    fn static_meta_class() -> ClassHandle {
        static CLASS: OnceLock<ClassHandle> = OnceLock::new();
        *CLASS.get_or_init(|| {
            ClassBuilder::new("AbstractClass")
                .base(<dyn MetaObject>::static_meta_class())
                .base(Interface::static_meta_class())
                .build()
        })
    }
}

/// Abstract class between `AbstractClass` and `Object`.
pub struct PreObject;

impl MetaClass for PreObject {
    fn static_meta_class() -> ClassHandle {
        static CLASS: OnceLock<ClassHandle> = OnceLock::new();
        *CLASS.get_or_init(|| {
            ClassBuilder::new("PreObject")
                .base(AbstractClass::static_meta_class())
                .build()
        })
    }
}

/// Concrete leaf registered as `Object`.
pub struct TestObject {
    base: Object,
    calls: AtomicUsize,
}

impl TestObject {
    /// How many times `Object.func` ran on this instance.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetaClass for TestObject {
    fn static_meta_class() -> ClassHandle {
        static CLASS: OnceLock<ClassHandle> = OnceLock::new();
        *CLASS.get_or_init(|| {
            ClassBuilder::new("Object")
                .base(PreObject::static_meta_class())
                .base(Interface::static_meta_class())
                .factory(|name| {
                    Arc::new(TestObject {
                        base: Object::new(name, TestObject::static_meta_class()),
                        calls: AtomicUsize::new(0),
                    })
                })
                .callable(Callable::method("Object.func", |this: &TestObject, _| {
                    this.calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Argument::void())
                }))
                .build()
        })
    }
}

impl MetaObject for TestObject {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn meta_class(&self) -> ClassHandle {
        Self::static_meta_class()
    }

    fn as_object(&self) -> Option<&Object> {
        Some(&self.base)
    }
}

/// Installs a capturing log printer for the lifetime of the guard.
///
/// Other tests log concurrently, so assertions should look for messages
/// naming something unique to the test.
pub struct LogCapture {
    printer: Arc<CapturePrinter>,
    id: PrinterId,
}

impl LogCapture {
    pub fn install() -> Self {
        let printer = Arc::new(CapturePrinter::new());
        let id = metaxis_log::add_printer(printer.clone());
        Self { printer, id }
    }

    pub fn contains(&self, message: &str) -> bool {
        self.printer.contains(message)
    }

    pub fn count(&self, message: &str) -> usize {
        self.printer.count(message)
    }
}

impl Drop for LogCapture {
    fn drop(&mut self) {
        metaxis_log::remove_printer(self.id);
    }
}
