//! Meta objects and the extensible [`Object`] base.
//!
//! This module implements the instance side of the runtime with:
//! - The [`MetaObject`] trait every runtime instance implements
//! - Checked downcasting of `dyn MetaObject` through [`AsAny`]
//! - The [`Object`] base, which owns named extensions and dispatches
//!   `invoke(name, args)` to them
//! - The two builtin classes, `meta.MetaObject` (the root) and `meta.Object`
//!
//! # Architecture
//!
//! Instances are shared as [`MetaObjectPtr`] (`Arc<dyn MetaObject>`). A type
//! that wants name-based dispatch embeds an [`Object`] and exposes it through
//! [`MetaObject::as_object`]. When such an instance is created through its
//! class, every callable of the class ancestry is attached as an extension
//! holding a weak reference back to the instance.
//!
//! # Thread Safety
//!
//! Each object guards its extension map with its own mutex. Handlers run
//! after that lock is released, so an extension may call back into the same
//! object.

use crate::error::{Error, Result};
use crate::runtime::extension::{ExtensionPtr, ObjectExtension};
use crate::runtime::{Argument, Callable, ClassBuilder, ClassHandle, MetaClass, PackagedArguments};
use fxhash::FxHashMap;
use metaxis_log::{error, trace};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Name of the root class.
pub const META_OBJECT_CLASS: &str = "meta.MetaObject";

/// Name of the extensible object class.
pub const OBJECT_CLASS: &str = "meta.Object";

/// Upcasts to `Any` for checked downcasting.
///
/// Implemented for every `Send + Sync + 'static` type.
pub trait AsAny: Any + Send + Sync {
    /// Borrows `self` as `Any`.
    fn as_any(&self) -> &dyn Any;

    /// Converts a shared pointer into a shared `Any`.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A runtime instance that knows its class.
pub trait MetaObject: AsAny {
    /// Instance name given at creation.
    fn name(&self) -> &str;

    /// Most-derived class of the instance.
    fn meta_class(&self) -> ClassHandle;

    /// The extensible base, if the instance has one.
    fn as_object(&self) -> Option<&Object> {
        None
    }
}

impl dyn MetaObject {
    /// Returns true if the concrete type is `T`.
    #[must_use]
    pub fn is<T: MetaObject>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrows the instance as `T`.
    #[must_use]
    pub fn downcast_ref<T: MetaObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for dyn MetaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaObject")
            .field("name", &self.name())
            .field("class", &self.meta_class())
            .finish()
    }
}

/// Shared pointer to a meta object.
pub type MetaObjectPtr = Arc<dyn MetaObject>;

/// The root class, `meta.MetaObject`.
///
/// Concrete: its instances are plain [`Object`]s whose class is the root.
/// Carries the `getName` method, returning the instance name as a `String`.
impl MetaClass for dyn MetaObject {
    fn static_meta_class() -> ClassHandle {
        static CLASS: OnceLock<ClassHandle> = OnceLock::new();
        *CLASS.get_or_init(|| {
            ClassBuilder::new(META_OBJECT_CLASS)
                .factory(|name| {
                    Arc::new(Object::new(name, <dyn MetaObject>::static_meta_class()))
                })
                .callable(Callable::dynamic_method("getName", |this, _| {
                    Ok(Argument::new(this.name().to_owned()))
                }))
                .build()
        })
    }
}

/// Process-unique object identity, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) const fn from_raw(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

/// Extensible object base.
///
/// # Example
///
/// ```rust
/// use metaxis::args;
/// use metaxis::runtime::{ClassHandle, MetaClass, MetaObject, Object};
///
/// let class = Object::static_meta_class();
/// let object = class.create("greeter").unwrap();
///
/// // Class methods are bound as extensions on creation.
/// let name = metaxis::runtime::invoke(&object, "getName", &args![]).unwrap();
/// assert_eq!(name.get::<String>().unwrap(), "greeter");
/// assert!(metaxis::runtime::invoke(&object, "missing", &args![]).is_err());
/// ```
pub struct Object {
    id: ObjectId,
    name: String,
    class: ClassHandle,
    extensions: Mutex<FxHashMap<String, ExtensionPtr>>,
}

impl MetaClass for Object {
    fn static_meta_class() -> ClassHandle {
        static CLASS: OnceLock<ClassHandle> = OnceLock::new();
        *CLASS.get_or_init(|| {
            ClassBuilder::new(OBJECT_CLASS)
                .base(<dyn MetaObject>::static_meta_class())
                .factory(|name| Object::create(name))
                .build()
        })
    }
}

impl Object {
    /// Creates an object base for an instance of `class`.
    ///
    /// Types embedding an `Object` pass their own class here.
    pub fn new(name: impl Into<String>, class: ClassHandle) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.into(),
            class,
            extensions: Mutex::new(FxHashMap::default()),
        }
    }

    /// Creates a bare `meta.Object` with no extensions.
    #[must_use]
    pub fn create(name: &str) -> Arc<Object> {
        Arc::new(Self::new(name, Self::static_meta_class()))
    }

    /// Returns the object's identity.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Attaches an extension.
    ///
    /// # Errors
    ///
    /// [`Error::ExtensionAlreadyAttached`] if it already extends this object,
    /// [`Error::ExtensionNameTaken`] if another extension with the same name
    /// does. Both are logged.
    ///
    /// # Panics
    ///
    /// Panics if the extension extends a different object.
    pub fn add_extension(&self, extension: &ExtensionPtr) -> Result<()> {
        let mut extensions = self.extensions.lock();

        match extension.owner() {
            Some(owner) if owner == self.id => {
                error!("Extension {} already extends the object.", extension.name());
                return Err(Error::ExtensionAlreadyAttached {
                    name: extension.name().to_owned(),
                });
            }
            Some(owner) => panic!(
                "extension {} already extends {owner}, cannot attach it to {}",
                extension.name(),
                self.id
            ),
            None => {}
        }

        if extensions.contains_key(extension.name()) {
            error!(
                "Extension {} is already registered on object {}.",
                extension.name(),
                self.name
            );
            return Err(Error::ExtensionNameTaken {
                name: extension.name().to_owned(),
            });
        }

        if let Err(owner) = extension.try_attach(self.id) {
            panic!(
                "extension {} already extends {owner}, cannot attach it to {}",
                extension.name(),
                self.id
            );
        }
        extensions.insert(extension.name().to_owned(), Arc::clone(extension));
        Ok(())
    }

    /// Detaches an extension.
    ///
    /// # Errors
    ///
    /// [`Error::ExtensionNotAttached`] (logged) if it does not extend this
    /// object.
    pub fn remove_extension(&self, extension: &ExtensionPtr) -> Result<()> {
        let mut extensions = self.extensions.lock();

        let attached_here = extension.owner() == Some(self.id)
            && extensions
                .get(extension.name())
                .is_some_and(|current| Arc::ptr_eq(current, extension));
        if !attached_here {
            error!("Extension {} does not extend the object.", extension.name());
            return Err(Error::ExtensionNotAttached {
                name: extension.name().to_owned(),
            });
        }

        extensions.remove(extension.name());
        extension.detach(self.id);
        Ok(())
    }

    /// Looks up an attached extension by name.
    #[must_use]
    pub fn find_extension(&self, name: &str) -> Option<ExtensionPtr> {
        self.extensions.lock().get(name).cloned()
    }

    /// Number of attached extensions.
    #[must_use]
    pub fn extension_count(&self) -> usize {
        self.extensions.lock().len()
    }

    /// Sorted names of the attached extensions.
    #[must_use]
    pub fn extension_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.extensions.lock().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Runs the extension called `name`.
    ///
    /// # Errors
    ///
    /// [`Error::ExtensionNotFound`] if no extension has that name, otherwise
    /// whatever the extension reports. A found extension that produces no
    /// value returns [`Argument::Void`].
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn invoke(&self, name: &str, args: &PackagedArguments) -> Result<Argument> {
        assert!(!name.is_empty(), "cannot invoke an extension with an empty name");

        let Some(extension) = self.find_extension(name) else {
            trace!("Object {} has no extension {}", self.name, name);
            return Err(Error::ExtensionNotFound {
                name: name.to_owned(),
            });
        };
        extension.run(args)
    }

    /// Attaches every callable reachable from the object's class, bound to
    /// `instance`. Names already taken by an extension are skipped.
    pub(crate) fn bind_methods(&self, instance: &MetaObjectPtr) {
        for callable in self.class.methods() {
            if self.find_extension(callable.name()).is_some() {
                continue;
            }
            let extension = ObjectExtension::bound(callable, Arc::downgrade(instance));
            // Collisions are logged by add_extension.
            let _ = self.add_extension(&extension);
        }
    }
}

impl MetaObject for Object {
    fn name(&self) -> &str {
        &self.name
    }

    fn meta_class(&self) -> ClassHandle {
        self.class
    }

    fn as_object(&self) -> Option<&Object> {
        Some(self)
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        for extension in self.extensions.get_mut().values() {
            extension.detach(self.id);
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("class", &self.class)
            .field("extensions", &self.extension_names())
            .finish()
    }
}

/// Invokes the extension called `name` on any meta object.
///
/// Instances without an [`Object`] base have no extensions.
///
/// # Errors
///
/// Same as [`Object::invoke`].
///
/// # Panics
///
/// Panics if `name` is empty.
pub fn invoke(object: &MetaObjectPtr, name: &str, args: &PackagedArguments) -> Result<Argument> {
    match object.as_object() {
        Some(base) => base.invoke(name, args),
        None => {
            assert!(!name.is_empty(), "cannot invoke an extension with an empty name");
            Err(Error::ExtensionNotFound {
                name: name.to_owned(),
            })
        }
    }
}
