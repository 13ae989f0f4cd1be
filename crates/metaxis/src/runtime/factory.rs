//! Name-indexed class registry.
//!
//! An [`ObjectFactory`] maps class names to [`ClassHandle`]s. Registering a
//! class registers its whole lineage: every ancestor that is not yet bound
//! by name is inserted first, bases before the classes deriving from them.
//!
//! Entries keep their insertion order; overriding a class replaces its entry
//! in place.
//!
//! # Thread Safety
//!
//! The map sits behind a single `RwLock`. Lookups share the read lock;
//! `register`, `override_class` and `clear` take the write lock for the whole
//! operation, so a failed call never leaves a partial lineage behind.
//! Diagnostics are logged after the lock is released, so a trace printer
//! may read the registry it is reporting on.

use crate::error::{Error, Result};
use crate::runtime::name::is_valid_name;
use crate::runtime::object::MetaObjectPtr;
use crate::runtime::ClassHandle;
use fxhash::{FxBuildHasher, FxHashSet};
use indexmap::IndexMap;
use metaxis_log::{debug, error, warn};
use parking_lot::RwLock;
use std::fmt;

type Entries = IndexMap<&'static str, ClassHandle, FxBuildHasher>;
type Outcome = std::result::Result<(), Rejection>;

/// Registry of classes by name.
///
/// # Example
///
/// ```rust
/// use metaxis::runtime::{ClassBuilder, MetaClass, Object, ObjectFactory};
///
/// let factory = ObjectFactory::new();
/// let widget = ClassBuilder::new("doc.Widget")
///     .base(Object::static_meta_class())
///     .build();
///
/// factory.register(widget).unwrap();
/// assert!(factory.register(widget).is_err());
///
/// // The lineage came along.
/// assert_eq!(factory.names(), vec!["meta.MetaObject", "meta.Object", "doc.Widget"]);
/// assert_eq!(factory.find_by_name("doc.Widget"), Some(widget));
/// ```
#[derive(Default)]
pub struct ObjectFactory {
    entries: RwLock<Entries>,
}

impl ObjectFactory {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `class` and every ancestor not yet bound by name.
    ///
    /// Ancestors whose name is already bound keep their current entry.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidClassName`] if the class or an ancestor about to be
    /// inserted has an invalid name, [`Error::ClassAlreadyRegistered`] if the
    /// class name is already bound. The registry is unchanged on error.
    pub fn register(&self, class: ClassHandle) -> Result<()> {
        let outcome = insert_lineage(&mut self.entries.write(), class);
        outcome.map_err(Rejection::report)?;
        debug!("Registered meta class {}", class.name());
        Ok(())
    }

    /// Replaces the class registered under `class`'s name.
    ///
    /// The replacement must derive from every direct base of the class it
    /// replaces. The entry keeps its position; new ancestors are inserted
    /// like [`ObjectFactory::register`] does.
    ///
    /// # Errors
    ///
    /// [`Error::IncompatibleOverride`] if the name is not registered or the
    /// replacement drops a base, [`Error::InvalidClassName`] if a new ancestor
    /// has an invalid name.
    pub fn override_class(&self, class: ClassHandle) -> Result<()> {
        let outcome = replace_entry(&mut self.entries.write(), class);
        outcome.map_err(Rejection::report)?;
        debug!("Overrode meta class {}", class.name());
        Ok(())
    }

    /// Looks up a class by name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<ClassHandle> {
        self.entries.read().get(name).copied()
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Snapshot of `(name, class)` pairs in insertion order.
    #[must_use]
    pub fn iter(&self) -> Vec<(&'static str, ClassHandle)> {
        self.entries
            .read()
            .iter()
            .map(|(name, class)| (*name, *class))
            .collect()
    }

    /// Snapshot of registered names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.read().keys().copied().collect()
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Creates an instance of the class registered as `class_name`.
    ///
    /// # Errors
    ///
    /// [`Error::ClassNotFound`] if the name is not bound,
    /// [`Error::AbstractClass`] if the class has no factory.
    pub fn create(&self, class_name: &str, instance_name: &str) -> Result<MetaObjectPtr> {
        let class = self
            .find_by_name(class_name)
            .ok_or_else(|| Error::ClassNotFound {
                name: class_name.to_owned(),
            })?;
        class.create(instance_name).ok_or_else(|| Error::AbstractClass {
            name: class_name.to_owned(),
        })
    }
}

impl fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectFactory")
            .field("classes", &self.names())
            .finish()
    }
}

/// Why a registry write was refused. Logged once the write lock is gone.
enum Rejection {
    InvalidName(ClassHandle),
    AlreadyRegistered(ClassHandle),
    NotRegistered(ClassHandle),
    MissingBase {
        class: ClassHandle,
        base: ClassHandle,
    },
}

impl Rejection {
    fn report(self) -> Error {
        match self {
            Self::InvalidName(class) => {
                error!("Invalid meta class name: {}", class.name());
                Error::InvalidClassName {
                    name: class.name().to_owned(),
                }
            }
            Self::AlreadyRegistered(class) => {
                warn!("Meta class {} is already registered.", class.name());
                Error::ClassAlreadyRegistered {
                    name: class.name().to_owned(),
                }
            }
            Self::NotRegistered(class) => {
                warn!(
                    "Meta class {} is not registered, nothing to override.",
                    class.name()
                );
                Error::IncompatibleOverride {
                    name: class.name().to_owned(),
                }
            }
            Self::MissingBase { class, base } => {
                warn!(
                    "Meta class {} cannot be overridden: base {} is missing.",
                    class.name(),
                    base.name()
                );
                Error::IncompatibleOverride {
                    name: class.name().to_owned(),
                }
            }
        }
    }
}

fn check_name(class: ClassHandle) -> Outcome {
    if is_valid_name(class.name()) {
        Ok(())
    } else {
        Err(Rejection::InvalidName(class))
    }
}

fn insert_lineage(entries: &mut Entries, class: ClassHandle) -> Outcome {
    check_name(class)?;
    if entries.contains_key(class.name()) {
        return Err(Rejection::AlreadyRegistered(class));
    }

    insert_pending(entries, class)?;
    entries.insert(class.name(), class);
    Ok(())
}

fn replace_entry(entries: &mut Entries, class: ClassHandle) -> Outcome {
    let existing = entries
        .get(class.name())
        .copied()
        .ok_or(Rejection::NotRegistered(class))?;

    if let Some(base) = existing.bases().find(|base| !class.has_ancestor(*base)) {
        return Err(Rejection::MissingBase { class, base });
    }

    insert_pending(entries, class)?;
    if let Some(slot) = entries.get_mut(class.name()) {
        *slot = class;
    }
    Ok(())
}

/// Inserts the unbound ancestors of `class`, or nothing if any has an
/// invalid name.
fn insert_pending(entries: &mut Entries, class: ClassHandle) -> Outcome {
    let pending = pending_ancestors(entries, class);
    pending.iter().try_for_each(|ancestor| check_name(*ancestor))?;
    for ancestor in pending {
        entries.insert(ancestor.name(), ancestor);
    }
    Ok(())
}

/// Ancestors of `class` (excluding itself) whose names are unbound, bases
/// first. The first class met under a given name wins.
fn pending_ancestors(entries: &Entries, class: ClassHandle) -> Vec<ClassHandle> {
    let mut claimed = FxHashSet::default();
    claimed.insert(class.name());

    class
        .lineage()
        .into_iter()
        .filter(|ancestor| *ancestor != class)
        .filter(|ancestor| !entries.contains_key(ancestor.name()))
        .filter(|ancestor| claimed.insert(ancestor.name()))
        .collect()
}
