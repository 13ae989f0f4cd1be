//! Named, type-erased methods attached to class descriptors.
//!
//! A [`Callable`] is a function over [`PackagedArguments`]. Methods that need
//! a receiver take it as argument 0; [`Callable::method`] unpacks and
//! downcasts it so the implementation sees `&T` directly.
//!
//! Each class descriptor owns a [`CallableTable`]. Lookups only consult the
//! table they are made on: inherited callables are found by walking the
//! ancestry explicitly (see
//! [`ClassHandle::find_callable_in_ancestry`](crate::runtime::ClassHandle::find_callable_in_ancestry)).

use crate::error::{Error, Result};
use crate::runtime::object::{MetaObject, MetaObjectPtr};
use crate::runtime::{Argument, PackagedArguments};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type CallableFn = dyn Fn(&PackagedArguments) -> Result<Argument> + Send + Sync;

/// A named method implementation.
///
/// # Example
///
/// ```rust
/// use metaxis::args;
/// use metaxis::runtime::{Argument, Callable};
///
/// let add = Callable::new("add", |args| {
///     args.expect_count(2)?;
///     Ok(Argument::new(args.get::<i32>(0)? + args.get::<i32>(1)?))
/// });
///
/// let sum = add.invoke(&args![2i32, 3i32]).unwrap();
/// assert_eq!(sum.get::<i32>().unwrap(), 5);
/// ```
pub struct Callable {
    name: String,
    function: Box<CallableFn>,
}

impl Callable {
    /// Creates a callable from a plain function over the argument list.
    pub fn new<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&PackagedArguments) -> Result<Argument> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            function: Box::new(function),
        }
    }

    /// Creates a method applicable to any meta object.
    ///
    /// The receiver is expected as argument 0, packed as a [`MetaObjectPtr`];
    /// `function` receives it along with the remaining arguments.
    pub fn dynamic_method<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&dyn MetaObject, &PackagedArguments) -> Result<Argument>
            + Send
            + Sync
            + 'static,
    {
        Self::new(name, move |args: &PackagedArguments| {
            let (receiver, rest) =
                args.split_first().ok_or(Error::ArgumentCountMismatch {
                    expected: 1,
                    got: 0,
                })?;
            let receiver = receiver.get::<MetaObjectPtr>()?;
            function(receiver.as_ref(), &rest)
        })
    }

    /// Creates a method whose receiver must be a `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use metaxis::args;
    /// use metaxis::runtime::{Argument, Callable, MetaObject, MetaObjectPtr, Object};
    ///
    /// let shout = Callable::method("shout", |this: &Object, _args| {
    ///     Ok(Argument::new(this.name().to_uppercase()))
    /// });
    ///
    /// let receiver: MetaObjectPtr = Object::create("quiet");
    /// let loud = shout.invoke_on(&receiver, &args![]).unwrap();
    /// assert_eq!(loud.get::<String>().unwrap(), "QUIET");
    /// ```
    pub fn method<T, F>(name: impl Into<String>, function: F) -> Self
    where
        T: MetaObject,
        F: Fn(&T, &PackagedArguments) -> Result<Argument> + Send + Sync + 'static,
    {
        let name = name.into();
        let method = name.clone();
        Self::dynamic_method(name, move |receiver, args| {
            let this = receiver.downcast_ref::<T>().ok_or_else(|| {
                Error::ReceiverMismatch {
                    method: method.clone(),
                    expected: type_name::<T>(),
                }
            })?;
            function(this, args)
        })
    }

    /// Returns the callable's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the implementation with `args`.
    ///
    /// # Errors
    ///
    /// Whatever the implementation reports, typically argument mismatches.
    pub fn invoke(&self, args: &PackagedArguments) -> Result<Argument> {
        (self.function)(args)
    }

    /// Calls a method with `receiver` packed in front of `args`.
    ///
    /// # Errors
    ///
    /// Same as [`Callable::invoke`].
    pub fn invoke_on(
        &self,
        receiver: &MetaObjectPtr,
        args: &PackagedArguments,
    ) -> Result<Argument> {
        self.invoke(&args.prepend(Argument::new(Arc::clone(receiver))))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Why a callable could not be added to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertRejection {
    Sealed,
    Duplicate,
}

/// Per-class name → callable map with a one-way seal.
#[derive(Default)]
pub(crate) struct CallableTable {
    entries: RwLock<FxHashMap<String, Arc<Callable>>>,
    sealed: AtomicBool,
}

impl CallableTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts unless sealed or the name is taken.
    ///
    /// The seal is checked under the write lock so an insert cannot race
    /// past a concurrent [`CallableTable::seal`].
    pub(crate) fn insert(
        &self,
        callable: Callable,
    ) -> std::result::Result<(), InsertRejection> {
        let mut entries = self.entries.write();
        if self.sealed.load(Ordering::Acquire) {
            return Err(InsertRejection::Sealed);
        }
        if entries.contains_key(callable.name()) {
            return Err(InsertRejection::Duplicate);
        }
        entries.insert(callable.name().to_owned(), Arc::new(callable));
        Ok(())
    }

    pub(crate) fn find(&self, name: &str) -> Option<Arc<Callable>> {
        self.entries.read().get(name).cloned()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn all(&self) -> Vec<Arc<Callable>> {
        let mut all: Vec<Arc<Callable>> =
            self.entries.read().values().cloned().collect();
        all.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        all
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub(crate) fn seal(&self) {
        let _entries = self.entries.write();
        self.sealed.store(true, Ordering::Release);
    }

    pub(crate) fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }
}
