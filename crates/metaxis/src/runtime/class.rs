//! `Class` descriptors, handles and declaration for the `metaxis` runtime.
//!
//! This module implements the class system with:
//! - Class metadata (name, abstractness, factory, callables, seal)
//! - Multiple inheritance with declaration-ordered base lists
//! - Transitive ancestry queries
//! - Instance creation through the class factory
//!
//! # Architecture
//!
//! Descriptors are **allocated once and never deallocated**:
//! - Each declaration produces exactly one descriptor in the descriptor arena
//! - A [`ClassHandle`] is a `Copy` reference to a `'static` descriptor
//! - Bases are recorded as [`ClassId`]s and must exist before the derived
//!   class is built, so the inheritance graph cannot contain cycles
//! - Names are not validated here; the object factory validates them when a
//!   class is registered
//!
//! # Declaring a class
//!
//! Rust types describe themselves through [`MetaClass`], building their
//! descriptor lazily on first use:
//!
//! ```rust
//! use std::sync::{Arc, OnceLock};
//! use metaxis::runtime::{
//!     ClassBuilder, ClassHandle, MetaClass, MetaObject, Object,
//! };
//!
//! struct Button {
//!     base: Object,
//! }
//!
//! impl MetaClass for Button {
//!     fn static_meta_class() -> ClassHandle {
//!         static CLASS: OnceLock<ClassHandle> = OnceLock::new();
//!         *CLASS.get_or_init(|| {
//!             ClassBuilder::new("ui.Button")
//!                 .base(Object::static_meta_class())
//!                 .factory(|name| {
//!                     Arc::new(Button {
//!                         base: Object::new(name, Button::static_meta_class()),
//!                     })
//!                 })
//!                 .build()
//!         })
//!     }
//! }
//!
//! impl MetaObject for Button {
//!     fn name(&self) -> &str {
//!         self.base.name()
//!     }
//!     fn meta_class(&self) -> ClassHandle {
//!         Self::static_meta_class()
//!     }
//!     fn as_object(&self) -> Option<&Object> {
//!         Some(&self.base)
//!     }
//! }
//!
//! let class = Button::static_meta_class();
//! assert!(class.is_derived_from_class::<Object>());
//! assert!(class.create_as::<Button>("ok").is_some());
//! ```
//!
//! # Thread Safety
//!
//! Handles are `Send + Sync`. Callable tables are guarded by an `RwLock` and
//! the seal is checked under that lock, so concurrent initialization paths
//! can add callables safely.

use crate::error::{Error, Result};
use crate::runtime::arena::{self, ClassId};
use crate::runtime::callable::{CallableTable, InsertRejection};
use crate::runtime::object::{MetaObject, MetaObjectPtr};
use crate::runtime::Callable;
use fxhash::FxHashSet;
use metaxis_log::{debug, error};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Instance factory bound to a concrete class.
pub type Factory = Box<dyn Fn(&str) -> MetaObjectPtr + Send + Sync>;

/// Static description of one class.
///
/// Descriptors live in the descriptor arena for the whole process and are
/// reached through [`ClassHandle`].
pub struct ClassDescriptor {
    id: ClassId,
    name: String,
    bases: Vec<ClassId>,
    factory: Option<Factory>,
    callables: CallableTable,
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("bases", &self.bases)
            .field("abstract", &self.factory.is_none())
            .field("callables", &self.callables.names())
            .field("sealed", &self.callables.is_sealed())
            .finish()
    }
}

/// Implemented by Rust types that describe themselves at runtime.
pub trait MetaClass {
    /// Returns the class handle of the implementing type.
    ///
    /// Implementations build the descriptor once (typically behind a
    /// `OnceLock`) and return the same handle on every call.
    fn static_meta_class() -> ClassHandle;
}

/// Stable, comparable identity of a class.
///
/// Two handles are equal iff they refer to the same descriptor.
#[derive(Clone, Copy)]
pub struct ClassHandle {
    descriptor: &'static ClassDescriptor,
}

impl ClassHandle {
    fn from_id(id: ClassId) -> Self {
        Self {
            descriptor: arena::resolve(id),
        }
    }

    /// Returns the handle of a [`MetaClass`] type.
    #[must_use]
    pub fn of<T: MetaClass + ?Sized>() -> Self {
        T::static_meta_class()
    }

    pub(crate) fn descriptor(&self) -> &'static ClassDescriptor {
        self.descriptor
    }

    /// Returns the arena id of the class.
    #[must_use]
    pub fn id(&self) -> ClassId {
        self.descriptor.id
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        &self.descriptor.name
    }

    /// Returns true if the class has no factory.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.descriptor.factory.is_none()
    }

    /// Number of direct bases.
    #[must_use]
    pub fn base_class_count(&self) -> usize {
        self.descriptor.bases.len()
    }

    /// Returns the direct base at `index`, in declaration order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.base_class_count()`.
    #[must_use]
    pub fn base_class(&self, index: usize) -> ClassHandle {
        let bases = &self.descriptor.bases;
        assert!(
            index < bases.len(),
            "base class index {index} out of range for {} ({} bases)",
            self.name(),
            bases.len()
        );
        Self::from_id(bases[index])
    }

    /// Iterates over the direct bases in declaration order.
    pub fn bases(&self) -> impl Iterator<Item = ClassHandle> + use<> {
        let descriptor = self.descriptor;
        descriptor.bases.iter().map(|id| Self::from_id(*id))
    }

    /// Returns true if `other` is this class or one of its transitive bases.
    #[must_use]
    pub fn has_ancestor(&self, other: ClassHandle) -> bool {
        if *self == other {
            return true;
        }

        let mut visited = FxHashSet::default();
        let mut stack = self.descriptor.bases.clone();
        while let Some(id) = stack.pop() {
            if id == other.id() {
                return true;
            }
            if visited.insert(id) {
                stack.extend_from_slice(&arena::resolve(id).bases);
            }
        }
        false
    }

    /// Returns true if this class is `other` or derives from it.
    #[must_use]
    pub fn is_derived_from(&self, other: ClassHandle) -> bool {
        self.has_ancestor(other)
    }

    /// Returns true if this class strictly derives from `T`'s class.
    ///
    /// Unlike [`ClassHandle::is_derived_from`], a class is not derived from
    /// itself here.
    #[must_use]
    pub fn is_derived_from_class<T: MetaClass + ?Sized>(&self) -> bool {
        let class = T::static_meta_class();
        *self != class && self.has_ancestor(class)
    }

    /// Returns true if `object`'s most-derived class is this class or derives
    /// from it.
    #[doc(alias = "is_instance_of")]
    #[must_use]
    pub fn is_meta_class_of(&self, object: &dyn MetaObject) -> bool {
        object.meta_class().has_ancestor(*self)
    }

    /// Returns this class followed by every transitive base, depth-first in
    /// declaration order, each class once.
    #[must_use]
    pub fn ancestors(&self) -> Vec<ClassHandle> {
        let mut visited = FxHashSet::default();
        let mut order = Vec::new();
        let mut stack = vec![self.id()];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let descriptor = arena::resolve(id);
            order.push(Self { descriptor });
            stack.extend(descriptor.bases.iter().rev().copied());
        }
        order
    }

    /// Returns every transitive base followed by this class, bases before the
    /// classes that derive from them, each class once.
    ///
    /// This is the order in which the object factory inserts a lineage.
    #[must_use]
    pub fn lineage(&self) -> Vec<ClassHandle> {
        fn visit(
            class: ClassHandle,
            visited: &mut FxHashSet<ClassId>,
            order: &mut Vec<ClassHandle>,
        ) {
            if !visited.insert(class.id()) {
                return;
            }
            for base in class.bases() {
                visit(base, visited, order);
            }
            order.push(class);
        }

        let mut visited = FxHashSet::default();
        let mut order = Vec::new();
        visit(*self, &mut visited, &mut order);
        order
    }

    /// Creates an instance through the class factory.
    ///
    /// Returns `None` for an abstract class. When the instance exposes an
    /// [`Object`](crate::runtime::Object) base, every callable reachable from
    /// its class is attached to it as an extension, so it can be invoked by
    /// name right away.
    #[must_use]
    pub fn create(&self, name: &str) -> Option<MetaObjectPtr> {
        let Some(factory) = self.descriptor.factory.as_ref() else {
            debug!("Meta class {} is abstract, no instance created", self.name());
            return None;
        };

        let instance = factory(name);
        if let Some(base) = instance.as_object() {
            base.bind_methods(&instance);
        }
        Some(instance)
    }

    /// Creates an instance and downcasts it to `T`.
    ///
    /// Returns `None` if the class is abstract or the factory produced some
    /// other type.
    #[must_use]
    pub fn create_as<T: MetaObject>(&self, name: &str) -> Option<Arc<T>> {
        let instance = self.create(name)?;
        instance.into_any_arc().downcast::<T>().ok()
    }

    /// Adds a callable to this class.
    ///
    /// # Errors
    ///
    /// [`Error::DescriptorSealed`] if the class is sealed,
    /// [`Error::CallableAlreadyRegistered`] if this class (ancestors are not
    /// consulted) already has a callable with the same name. Both are logged.
    pub fn add_callable(&self, callable: Callable) -> Result<()> {
        let name = callable.name().to_owned();
        match self.descriptor.callables.insert(callable) {
            Ok(()) => Ok(()),
            Err(InsertRejection::Sealed) => {
                error!(
                    "Meta class {} is sealed, callable {} rejected.",
                    self.name(),
                    name
                );
                Err(Error::DescriptorSealed {
                    class: self.name().to_owned(),
                })
            }
            Err(InsertRejection::Duplicate) => {
                error!("Callable {} is already registered to metaclass.", name);
                Err(Error::CallableAlreadyRegistered { name })
            }
        }
    }

    /// Looks up a callable on this class only.
    #[must_use]
    pub fn find_callable(&self, name: &str) -> Option<Arc<Callable>> {
        self.descriptor.callables.find(name)
    }

    /// Looks up a callable on this class, then on its ancestors in
    /// [`ClassHandle::ancestors`] order. Returns the providing class too.
    #[must_use]
    pub fn find_callable_in_ancestry(
        &self,
        name: &str,
    ) -> Option<(ClassHandle, Arc<Callable>)> {
        self.ancestors()
            .into_iter()
            .find_map(|class| class.find_callable(name).map(|c| (class, c)))
    }

    /// Every callable reachable from this class; when several classes define
    /// the same name, the first in [`ClassHandle::ancestors`] order wins.
    #[must_use]
    pub fn methods(&self) -> Vec<Arc<Callable>> {
        let mut seen = FxHashSet::default();
        let mut methods = Vec::new();
        for class in self.ancestors() {
            for callable in class.descriptor.callables.all() {
                if seen.insert(callable.name().to_owned()) {
                    methods.push(callable);
                }
            }
        }
        methods
    }

    /// Sorted names of the callables defined on this class.
    #[must_use]
    pub fn callable_names(&self) -> Vec<String> {
        self.descriptor.callables.names()
    }

    /// Number of callables defined on this class.
    #[must_use]
    pub fn callable_count(&self) -> usize {
        self.descriptor.callables.len()
    }

    /// Seals the class: no further callables may be added.
    pub fn seal(&self) {
        self.descriptor.callables.seal();
    }

    /// Returns true if the class is sealed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.descriptor.callables.is_sealed()
    }
}

impl PartialEq for ClassHandle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.descriptor, other.descriptor)
    }
}

impl Eq for ClassHandle {}

impl Hash for ClassHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for ClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassHandle")
            .field(&self.name())
            .field(&self.id().as_u32())
            .finish()
    }
}

impl fmt::Display for ClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Explicit class declaration.
///
/// Bases must already be built. The builder does not validate the name; the
/// object factory does so on registration.
///
/// # Example
///
/// ```rust
/// use metaxis::runtime::{Argument, Callable, ClassBuilder};
///
/// let shape = ClassBuilder::new("geo.Shape").build();
/// let square = ClassBuilder::new("geo.Square")
///     .base(shape)
///     .callable(Callable::new("sides", |_| Ok(Argument::new(4u32))))
///     .build();
///
/// assert!(shape.is_abstract());
/// assert!(square.is_derived_from(shape));
/// assert!(square.find_callable("sides").is_some());
/// ```
pub struct ClassBuilder {
    name: String,
    bases: Vec<ClassId>,
    factory: Option<Factory>,
    callables: Vec<Callable>,
    sealed: bool,
}

impl ClassBuilder {
    /// Starts a declaration. Without a factory the class is abstract.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            factory: None,
            callables: Vec::new(),
            sealed: false,
        }
    }

    /// Appends a direct base.
    #[must_use]
    pub fn base(mut self, base: ClassHandle) -> Self {
        self.bases.push(base.id());
        self
    }

    /// Appends several direct bases, in order.
    #[must_use]
    pub fn bases(mut self, bases: impl IntoIterator<Item = ClassHandle>) -> Self {
        self.bases.extend(bases.into_iter().map(|base| base.id()));
        self
    }

    /// Binds the instance factory, making the class concrete.
    #[must_use]
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> MetaObjectPtr + Send + Sync + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Adds a callable.
    #[must_use]
    pub fn callable(mut self, callable: Callable) -> Self {
        self.callables.push(callable);
        self
    }

    /// Seals the class once its callables are installed.
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// Allocates the descriptor and returns its handle.
    ///
    /// Duplicate callable names are logged and the later one is dropped.
    pub fn build(self) -> ClassHandle {
        let Self {
            name,
            bases,
            factory,
            callables,
            sealed,
        } = self;

        let descriptor = arena::alloc(|id| ClassDescriptor {
            id,
            name,
            bases,
            factory,
            callables: CallableTable::new(),
        });
        let handle = ClassHandle { descriptor };

        for callable in callables {
            // Already logged by add_callable.
            let _ = handle.add_callable(callable);
        }
        if sealed {
            handle.seal();
        }

        debug!("Declared meta class {} as {}", handle.name(), handle.id());
        handle
    }
}
