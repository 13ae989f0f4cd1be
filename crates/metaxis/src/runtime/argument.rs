//! Type-erased arguments and return values for name-based dispatch.
//!
//! The runtime never interprets payloads; it only forwards them from the
//! caller to a factory, a [`Callable`](crate::runtime::Callable) or an
//! [`ObjectExtension`](crate::runtime::ObjectExtension). Extraction on the
//! receiving side is checked: asking for the wrong type yields
//! [`Error::ArgumentTypeMismatch`] instead of an unchecked cast.
//!
//! # Example
//!
//! ```rust
//! use metaxis::args;
//! use metaxis::runtime::{Argument, PackagedArguments};
//!
//! let packed = args![42i32, String::from("label")];
//! assert_eq!(packed.len(), 2);
//! assert_eq!(packed.get::<i32>(0).unwrap(), 42);
//! assert!(packed.get::<u64>(0).is_err());
//!
//! let ret = Argument::void();
//! assert!(ret.is_void());
//! ```

use crate::error::{Error, Result};
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// A single argument or return value.
///
/// `Void` is the "found but produced no value" state of a dispatch; it is
/// distinct from a failed lookup, which is reported as an error.
#[derive(Clone)]
pub enum Argument {
    /// No value.
    Void,
    /// A shared, type-erased value.
    Value {
        /// The payload.
        data: Arc<dyn Any + Send + Sync>,
        /// `std::any::type_name` of the payload, kept for diagnostics.
        type_name: &'static str,
    },
}

impl Argument {
    /// Wraps a value.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Argument::Value {
            data: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// The empty return value.
    #[must_use]
    pub const fn void() -> Self {
        Argument::Void
    }

    /// Returns true for [`Argument::Void`].
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Argument::Void)
    }

    /// Name of the stored type, `"()"` for void.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Argument::Void => "()",
            Argument::Value { type_name, .. } => *type_name,
        }
    }

    /// Returns true if the argument holds a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// Borrows the payload as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Argument::Void => None,
            Argument::Value { data, .. } => data.downcast_ref::<T>(),
        }
    }

    /// Clones the payload out as `T`.
    ///
    /// # Errors
    ///
    /// [`Error::VoidArgument`] for a void argument,
    /// [`Error::ArgumentTypeMismatch`] if the payload is not a `T`.
    pub fn get<T: Any + Clone>(&self) -> Result<T> {
        match self {
            Argument::Void => Err(Error::VoidArgument),
            Argument::Value { data, type_name: got } => data
                .downcast_ref::<T>()
                .cloned()
                .ok_or(Error::ArgumentTypeMismatch {
                    expected: type_name::<T>(),
                    got: *got,
                }),
        }
    }

    /// Returns the shared payload as `Arc<T>` without cloning `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Argument::get`].
    pub fn get_arc<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        match self {
            Argument::Void => Err(Error::VoidArgument),
            Argument::Value { data, type_name: got } => Arc::clone(data)
                .downcast::<T>()
                .map_err(|_| Error::ArgumentTypeMismatch {
                    expected: type_name::<T>(),
                    got: *got,
                }),
        }
    }
}

impl Default for Argument {
    fn default() -> Self {
        Argument::Void
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Void => write!(f, "Argument::Void"),
            Argument::Value { type_name, .. } => {
                write!(f, "Argument::Value({type_name})")
            }
        }
    }
}

/// An ordered list of arguments.
///
/// Arity and element types are opaque to the runtime; callables validate
/// what they receive through [`PackagedArguments::get`] and
/// [`PackagedArguments::expect_count`].
#[derive(Clone, Default, Debug)]
pub struct PackagedArguments {
    args: Vec<Argument>,
}

impl PackagedArguments {
    /// Creates an empty argument list.
    #[must_use]
    pub const fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Appends a value.
    pub fn push<T: Any + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.args.push(Argument::new(value));
        self
    }

    /// Appends an already wrapped argument.
    pub fn push_argument(&mut self, argument: Argument) -> &mut Self {
        self.args.push(argument);
        self
    }

    /// Returns a copy of this list with `argument` inserted at the front.
    #[must_use]
    pub fn prepend(&self, argument: Argument) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(argument);
        args.extend(self.args.iter().cloned());
        Self { args }
    }

    /// Splits off the first argument, typically a method receiver.
    #[must_use]
    pub fn split_first(&self) -> Option<(&Argument, PackagedArguments)> {
        self.args.split_first().map(|(first, rest)| {
            (
                first,
                Self {
                    args: rest.to_vec(),
                },
            )
        })
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns true if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Borrows the argument at `index`.
    #[must_use]
    pub fn argument(&self, index: usize) -> Option<&Argument> {
        self.args.get(index)
    }

    /// Clones the argument at `index` out as `T`.
    ///
    /// # Errors
    ///
    /// [`Error::ArgumentCountMismatch`] if `index` is out of range, otherwise
    /// the errors of [`Argument::get`].
    pub fn get<T: Any + Clone>(&self, index: usize) -> Result<T> {
        self.args
            .get(index)
            .ok_or(Error::ArgumentCountMismatch {
                expected: index.saturating_add(1),
                got: self.args.len(),
            })?
            .get::<T>()
    }

    /// Checks the arity.
    ///
    /// # Errors
    ///
    /// [`Error::ArgumentCountMismatch`] if the list does not hold exactly
    /// `expected` arguments.
    pub fn expect_count(&self, expected: usize) -> Result<()> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(Error::ArgumentCountMismatch {
                expected,
                got: self.args.len(),
            })
        }
    }

    /// Iterates over the arguments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.args.iter()
    }
}

impl FromIterator<Argument> for PackagedArguments {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PackagedArguments {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

/// Packs values into [`PackagedArguments`].
///
/// ```rust
/// use metaxis::args;
///
/// let empty = args![];
/// assert!(empty.is_empty());
///
/// let two = args![1u8, "two"];
/// assert_eq!(two.get::<&str>(1).unwrap(), "two");
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::runtime::PackagedArguments::new()
    };
    ($($value:expr),+ $(,)?) => {
        {
            let mut packed = $crate::runtime::PackagedArguments::new();
            $(packed.push($value);)+
            packed
        }
    };
}
