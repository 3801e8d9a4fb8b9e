//! Shared record handles.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::{Arc, Weak};

/// A shared handle to an entity instance.
///
/// Records are what the manager saves, loads and caches. Cloning a record
/// clones the handle, not the entity: every clone observes the same state,
/// and [`Record::ptr_eq`] tells whether two handles are the same instance.
///
/// Guards returned by [`read`](Record::read) and [`write`](Record::write)
/// must be dropped before handing the record back to the manager.
///
/// # Example
///
/// ```rust,ignore
/// let book = Record::new(Book::new("Dune"));
/// manager.save(&book)?;
/// assert!(book.read().id.is_some());
/// ```
pub struct Record<T>(Arc<RwLock<T>>);

impl<T> Record<T> {
    /// Wraps `entity` in a new record.
    pub fn new(entity: T) -> Self {
        Self(Arc::new(RwLock::new(entity)))
    }

    /// Locks the entity for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Locks the entity for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Returns true if both handles refer to the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Creates a weak handle that doesn't keep the entity alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakRecord<T> {
        WeakRecord(Arc::downgrade(&self.0))
    }

    /// Returns a copy of the entity's current state.
    #[must_use]
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.0.read().clone()
    }
}

impl<T> Clone for Record<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(entity) => f.debug_tuple("Record").field(&*entity).finish(),
            None => f.write_str("Record(<locked>)"),
        }
    }
}

/// A weak record handle.
pub struct WeakRecord<T>(Weak<RwLock<T>>);

impl<T> WeakRecord<T> {
    /// Creates a handle that never upgrades.
    #[must_use]
    pub fn new() -> Self {
        Self(Weak::new())
    }

    /// Returns the record if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Record<T>> {
        self.0.upgrade().map(Record)
    }
}

impl<T> Default for WeakRecord<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for WeakRecord<T> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<T> fmt::Debug for WeakRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(WeakRecord)")
    }
}
