//! `Metaxis`: runtime class registry and name-based dispatch
//!
//! `Metaxis` lets a statically compiled object model describe itself at
//! runtime. It provides:
//!
//! - **Class Descriptors** with names, multiple inheritance and abstractness
//! - **Deep Registration** of a class together with its whole lineage
//! - **Instance Creation** by class name through per-class factories
//! - **Dynamic Dispatch** of named methods and extensions with type-erased
//!   arguments
//! - **Runtime Reflection** for hierarchy and method introspection
//!
//! # Architecture
//!
//! - **Declaration**: [`runtime::ClassBuilder`] and [`runtime::MetaClass`]
//!   produce one immutable descriptor per class, stored for the process
//!   lifetime
//! - **Registry**: [`runtime::ObjectFactory`] binds names to classes
//! - **Instances**: [`runtime::MetaObject`] implementors, optionally embedding
//!   an extensible [`runtime::Object`]
//!
//! # Example
//!
//! ```rust
//! use metaxis::args;
//! use metaxis::runtime::{Domain, DomainArguments, invoke};
//!
//! let domain = Domain::new();
//! domain.initialize(&DomainArguments::default()).unwrap();
//!
//! let factory = domain.object_factory().unwrap();
//! let object = factory.create("meta.MetaObject", "first").unwrap();
//!
//! let name = invoke(&object, "getName", &args![]).unwrap();
//! assert_eq!(name.get::<String>().unwrap(), "first");
//! ```

pub mod error;
pub mod runtime;

// Re-export commonly used types
pub use error::{Error, Result};
pub use runtime::{
    Argument, Callable, ClassBuilder, ClassHandle, Domain, DomainArguments,
    MetaClass, MetaObject, MetaObjectPtr, Object, ObjectExtension,
    ObjectFactory, PackagedArguments,
};
