//! `Metaxis` runtime module.
//!
//! This module provides the runtime class system, including:
//!
//! - Class descriptors with multiple inheritance and named callables
//! - A name-indexed registry with deep registration
//! - Objects that dispatch calls by name to attached extensions
//!
//! # Architecture
//!
//! The runtime is organized into several modules:
//!
//! - [`name`]: Class name validation
//! - [`arena`]: Process-wide descriptor storage addressed by [`ClassId`]
//! - [`argument`]: Type-erased arguments and return values
//! - [`callable`]: Named methods and per-class callable tables
//! - [`class`]: Class descriptors, handles and declaration
//! - [`object`]: The [`MetaObject`] trait and the extensible [`Object`] base
//! - [`extension`]: Named behaviours attached to objects
//! - [`factory`]: The [`ObjectFactory`] registry
//! - [`domain`]: Process-wide lifecycle for one object factory
//! - [`introspection`]: Read-only queries over classes and objects
//!
//! # Example
//!
//! ```rust
//! use metaxis::args;
//! use metaxis::runtime::{ClassBuilder, MetaClass, Object, ObjectFactory, invoke};
//!
//! let factory = ObjectFactory::new();
//! let shape = ClassBuilder::new("example.Shape")
//!     .base(Object::static_meta_class())
//!     .build();
//! factory.register(shape).unwrap();
//! assert_eq!(factory.len(), 3);
//!
//! // Abstract classes cannot be instantiated; their bases can.
//! assert!(factory.create("example.Shape", "s1").is_err());
//! let object = factory.create("meta.Object", "o1").unwrap();
//! let name = invoke(&object, "getName", &args![]).unwrap();
//! assert_eq!(name.get::<String>().unwrap(), "o1");
//! ```

pub mod arena;
pub mod argument;
pub mod callable;
pub mod class;
pub mod domain;
pub mod extension;
pub mod factory;
pub mod introspection;
pub mod name;
pub mod object;

pub use arena::{ClassId, declared_class_count};
pub use argument::{Argument, PackagedArguments};
pub use callable::Callable;
pub use class::{ClassBuilder, ClassDescriptor, ClassHandle, Factory, MetaClass};
pub use domain::{Domain, DomainArguments};
pub use extension::{ExtensionPtr, ObjectExtension};
pub use factory::ObjectFactory;
pub use name::is_valid_name;
pub use object::{
    AsAny, META_OBJECT_CLASS, MetaObject, MetaObjectPtr, OBJECT_CLASS, Object,
    ObjectId, invoke,
};

// Re-export commonly used introspection APIs
pub use introspection::{
    all_methods, class_hierarchy, has_method, is_instance, is_subclass,
    method_provider, responds_to, subclasses,
};
