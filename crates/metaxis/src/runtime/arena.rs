//! Process-wide storage for class descriptors.
//!
//! Descriptors are allocated once, when a class is declared, and are never
//! freed. Each one is addressed by a [`ClassId`]: a dense 32-bit index into
//! the arena. Base-class lists store ids rather than references, so the
//! inheritance graph is plain data and a descriptor can only name bases
//! that were declared before it.
//!
//! # Thread Safety
//!
//! The arena is append-only. Allocation takes the write lock; resolving an id
//! takes the read lock only long enough to copy out a `&'static` reference.

use crate::runtime::class::ClassDescriptor;
use parking_lot::RwLock;
use std::fmt;
use std::sync::OnceLock;

/// Stable identifier of a declared class.
///
/// Ids are assigned in declaration order and are unique for the lifetime of
/// the process. Two handles referring to the same descriptor always carry
/// the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(u32);

impl ClassId {
    /// Returns the raw index.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the raw index as usize.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

struct DescriptorArena {
    slots: RwLock<Vec<&'static ClassDescriptor>>,
}

static ARENA: OnceLock<DescriptorArena> = OnceLock::new();

fn arena() -> &'static DescriptorArena {
    ARENA.get_or_init(|| DescriptorArena {
        slots: RwLock::new(Vec::with_capacity(64)),
    })
}

/// Allocates a descriptor and assigns it the next id.
///
/// `build` runs under the arena write lock and must not resolve ids itself.
///
/// # Panics
///
/// Panics if more than `u32::MAX` classes are declared.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn alloc(
    build: impl FnOnce(ClassId) -> ClassDescriptor,
) -> &'static ClassDescriptor {
    let mut slots = arena().slots.write();
    assert!(
        slots.len() < u32::MAX as usize,
        "class descriptor arena exhausted"
    );

    let id = ClassId(slots.len() as u32);
    let descriptor: &'static ClassDescriptor = Box::leak(Box::new(build(id)));
    slots.push(descriptor);
    descriptor
}

/// Resolves an id to its descriptor.
///
/// Ids are only minted by [`alloc`], so every id resolves.
pub(crate) fn resolve(id: ClassId) -> &'static ClassDescriptor {
    arena().slots.read()[id.as_usize()]
}

/// Number of class descriptors declared so far in this process.
#[must_use]
pub fn declared_class_count() -> usize {
    arena().slots.read().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ClassBuilder;

    #[test]
    fn test_ids_are_dense_and_resolvable() {
        let first = ClassBuilder::new("ArenaTest.First").build();
        let second = ClassBuilder::new("ArenaTest.Second").build();

        assert!(second.id() > first.id());
        assert!(std::ptr::eq(resolve(first.id()), first.descriptor()));
        assert!(std::ptr::eq(resolve(second.id()), second.descriptor()));
        assert!(declared_class_count() > second.id().as_usize());
    }

    #[test]
    fn test_class_id_display() {
        let handle = ClassBuilder::new("ArenaTest.Display").build();
        assert_eq!(
            format!("{}", handle.id()),
            format!("ClassId({})", handle.id().as_u32())
        );
    }
}
