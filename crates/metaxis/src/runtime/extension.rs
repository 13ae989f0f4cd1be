//! Named behaviours attached to objects.
//!
//! An [`ObjectExtension`] is a name plus a handler over
//! [`PackagedArguments`]. Objects dispatch `invoke(name, args)` to the
//! extension with that name. An extension extends at most one object at a
//! time; the owner is tracked as an atomic [`ObjectId`] token so ownership
//! checks never need the owner's lock.

use crate::error::{Error, Result};
use crate::runtime::object::{MetaObject, MetaObjectPtr, ObjectId};
use crate::runtime::{Argument, Callable, PackagedArguments};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Handler = dyn Fn(&PackagedArguments) -> Result<Argument> + Send + Sync;

/// Shared pointer to an extension.
pub type ExtensionPtr = Arc<ObjectExtension>;

/// Sentinel owner value: not attached.
const NO_OWNER: u64 = 0;

/// A named, invocable behaviour that can extend one object.
///
/// # Example
///
/// ```rust
/// use metaxis::args;
/// use metaxis::runtime::{Argument, Object, ObjectExtension};
///
/// let object = Object::create("counter");
/// let double = ObjectExtension::new("double", |args| {
///     Ok(Argument::new(args.get::<i64>(0)? * 2))
/// });
///
/// object.add_extension(&double).unwrap();
/// assert!(double.is_attached());
///
/// let result = object.invoke("double", &args![21i64]).unwrap();
/// assert_eq!(result.get::<i64>().unwrap(), 42);
/// ```
pub struct ObjectExtension {
    name: String,
    owner: AtomicU64,
    handler: Box<Handler>,
}

impl ObjectExtension {
    /// Creates a detached extension.
    pub fn new<F>(name: impl Into<String>, handler: F) -> ExtensionPtr
    where
        F: Fn(&PackagedArguments) -> Result<Argument> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            owner: AtomicU64::new(NO_OWNER),
            handler: Box::new(handler),
        })
    }

    /// Wraps a callable; arguments are forwarded unchanged.
    pub fn from_callable(callable: Arc<Callable>) -> ExtensionPtr {
        let name = callable.name().to_owned();
        Self::new(name, move |args| callable.invoke(args))
    }

    /// Wraps a method callable with a fixed receiver.
    ///
    /// The receiver is held weakly so an object can own extensions bound to
    /// itself. Running the extension after the receiver is gone fails with
    /// [`Error::ReceiverMismatch`].
    pub fn bound(callable: Arc<Callable>, receiver: Weak<dyn MetaObject>) -> ExtensionPtr {
        let name = callable.name().to_owned();
        Self::new(name, move |args| {
            let receiver = receiver.upgrade().ok_or_else(|| Error::ReceiverMismatch {
                method: callable.name().to_owned(),
                expected: std::any::type_name::<MetaObjectPtr>(),
            })?;
            callable.invoke_on(&receiver, args)
        })
    }

    /// Returns the extension name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the object this extension currently extends.
    #[must_use]
    pub fn owner(&self) -> Option<ObjectId> {
        ObjectId::from_raw(self.owner.load(Ordering::Acquire))
    }

    /// Returns true if the extension extends some object.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.owner().is_some()
    }

    /// Runs the handler.
    ///
    /// # Errors
    ///
    /// Whatever the handler reports.
    pub fn run(&self, args: &PackagedArguments) -> Result<Argument> {
        (self.handler)(args)
    }

    /// Claims the extension for `owner`. On failure returns the current owner.
    pub(crate) fn try_attach(&self, owner: ObjectId) -> std::result::Result<(), ObjectId> {
        self.owner
            .compare_exchange(NO_OWNER, owner.as_u64(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|current| ObjectId::from_raw(current).unwrap_or(owner))
    }

    /// Releases the extension if `owner` holds it.
    pub(crate) fn detach(&self, owner: ObjectId) -> bool {
        self.owner
            .compare_exchange(owner.as_u64(), NO_OWNER, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl fmt::Debug for ObjectExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectExtension")
            .field("name", &self.name)
            .field("owner", &self.owner())
            .finish_non_exhaustive()
    }
}
