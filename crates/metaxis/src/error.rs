//! Error types for the `metaxis` runtime.
//!
//! Every expected runtime condition (name collisions, missing lookups, sealed
//! descriptors, argument mismatches) surfaces as an [`Error`] value. Broken
//! preconditions, such as indexing past the last base class, panic instead.

use std::fmt;

/// Errors that can occur in the `metaxis` runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Class name contains characters outside `[A-Za-z0-9.:_-]` or is empty.
    InvalidClassName {
        /// The rejected name.
        name: String,
    },

    /// Class name is already bound in the object factory.
    ClassAlreadyRegistered {
        /// The class name.
        name: String,
    },

    /// No compatible registered class to override.
    IncompatibleOverride {
        /// The class name.
        name: String,
    },

    /// No class registered under the name.
    ClassNotFound {
        /// The class name.
        name: String,
    },

    /// The class has no factory and cannot be instantiated.
    AbstractClass {
        /// The class name.
        name: String,
    },

    /// The descriptor is sealed and accepts no further callables.
    DescriptorSealed {
        /// The class name.
        class: String,
    },

    /// A callable with the same name is already registered on the class.
    CallableAlreadyRegistered {
        /// The callable name.
        name: String,
    },

    /// The extension already extends the object.
    ExtensionAlreadyAttached {
        /// The extension name.
        name: String,
    },

    /// Another extension with the same name already extends the object.
    ExtensionNameTaken {
        /// The extension name.
        name: String,
    },

    /// The extension does not extend the object.
    ExtensionNotAttached {
        /// The extension name.
        name: String,
    },

    /// No extension with the name extends the object.
    ExtensionNotFound {
        /// The extension name.
        name: String,
    },

    /// A method was invoked with a receiver of the wrong type.
    ReceiverMismatch {
        /// The method name.
        method: String,
        /// The receiver type the method was declared for.
        expected: &'static str,
    },

    /// Argument count mismatch for a callable.
    ArgumentCountMismatch {
        /// Expected number of arguments
        expected: usize,
        /// Actual number of arguments provided
        got: usize,
    },

    /// Argument type mismatch for a callable.
    ArgumentTypeMismatch {
        /// Expected Rust type name
        expected: &'static str,
        /// Actual Rust type name
        got: &'static str,
    },

    /// A value was requested from a void argument.
    VoidArgument,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidClassName { name } => {
                write!(f, "Invalid meta class name: {name}")
            }
            Error::ClassAlreadyRegistered { name } => {
                write!(f, "Meta class {name} is already registered")
            }
            Error::IncompatibleOverride { name } => {
                write!(
                    f,
                    "Meta class {name} has no compatible registration to override"
                )
            }
            Error::ClassNotFound { name } => {
                write!(f, "Meta class {name} is not registered")
            }
            Error::AbstractClass { name } => {
                write!(f, "Meta class {name} is abstract")
            }
            Error::DescriptorSealed { class } => {
                write!(f, "Meta class {class} is sealed")
            }
            Error::CallableAlreadyRegistered { name } => {
                write!(f, "Callable {name} is already registered to metaclass.")
            }
            Error::ExtensionAlreadyAttached { name } => {
                write!(f, "Extension {name} already extends the object.")
            }
            Error::ExtensionNameTaken { name } => {
                write!(
                    f,
                    "An extension named {name} already extends the object."
                )
            }
            Error::ExtensionNotAttached { name } => {
                write!(f, "Extension {name} does not extend the object.")
            }
            Error::ExtensionNotFound { name } => {
                write!(f, "Extension {name} not found")
            }
            Error::ReceiverMismatch { method, expected } => {
                write!(f, "Method {method} expects a receiver of type {expected}")
            }
            Error::ArgumentCountMismatch { expected, got } => {
                write!(
                    f,
                    "Argument count mismatch: expected {expected}, got {got}"
                )
            }
            Error::ArgumentTypeMismatch { expected, got } => {
                write!(
                    f,
                    "Argument type mismatch: expected '{expected}', got '{got}'"
                )
            }
            Error::VoidArgument => write!(f, "Argument holds no value"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for `metaxis` runtime operations.
pub type Result<T> = std::result::Result<T, Error>;
