//! Relation fields.
//!
//! A child refers to its parent through a [`ManyToOne`], which stores the
//! parent's key and, when the parent is loaded, a weak handle to it. A
//! parent owns its children through a [`OneToMany`]. Only the parent side
//! holds strong handles, so linked records never form a reference cycle.

use crate::entity::Entity;
use crate::error::OrmResult;
use crate::key::Key;
use crate::manager::Manager;
use crate::metadata::{descriptor_of, primary_key_of, short_type_name};
use crate::record::{Record, WeakRecord};
use minorm_driver::Value;
use std::fmt;

/// A reference from a child to its parent entity `P`.
pub struct ManyToOne<P> {
    key: Option<Key>,
    target: WeakRecord<P>,
}

impl<P: Entity> ManyToOne<P> {
    /// Creates an unset reference.
    #[must_use]
    pub fn new() -> Self {
        Self {
            key: None,
            target: WeakRecord::new(),
        }
    }

    /// Creates a reference linked to `parent`.
    ///
    /// # Errors
    ///
    /// Fails if the parent's key cannot be read.
    pub fn to(parent: &Record<P>) -> OrmResult<Self> {
        let mut link = Self::new();
        link.set(parent)?;
        Ok(link)
    }

    /// Creates a reference holding only the parent's key.
    #[must_use]
    pub fn with_key(key: impl Into<Key>) -> Self {
        Self {
            key: Some(key.into()),
            target: WeakRecord::new(),
        }
    }

    /// Links this reference to `parent`.
    ///
    /// The reference is left unchanged if the parent's key cannot be read.
    pub fn set(&mut self, parent: &Record<P>) -> OrmResult<()> {
        self.key = primary_key_of(&*parent.read())?;
        self.target = parent.downgrade();
        Ok(())
    }

    /// Removes the reference.
    pub fn clear(&mut self) {
        self.key = None;
        self.target = WeakRecord::new();
    }

    /// Returns the linked parent record, if it is loaded.
    #[must_use]
    pub fn target(&self) -> Option<Record<P>> {
        self.target.upgrade()
    }

    /// Returns true if the reference points at a parent.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.key.is_some() || self.target.upgrade().is_some()
    }

    /// Returns the parent's key.
    ///
    /// A loaded parent is asked for its current key, so a parent saved after
    /// linking is seen with its assigned key.
    pub fn key(&self) -> OrmResult<Option<Key>> {
        match self.target.upgrade() {
            Some(parent) => {
                let key = primary_key_of(&*parent.read())?;
                Ok(key.or_else(|| self.key.clone()))
            }
            None => Ok(self.key.clone()),
        }
    }

    /// Returns the parent's key as a column value.
    pub fn to_value(&self) -> OrmResult<Value> {
        Ok(self.key()?.map_or(Value::Null, |k| k.to_value()))
    }

    /// Sets the reference from a column value holding the parent's key.
    ///
    /// `NULL` clears the reference. A loaded parent with a different key is
    /// unlinked.
    pub fn set_value(&mut self, value: Value) -> OrmResult<()> {
        let descriptor = descriptor_of::<P>()?;
        let Some(key) = Key::for_type(&descriptor.primary_key.field_type, value)? else {
            self.clear();
            return Ok(());
        };
        if let Some(parent) = self.target.upgrade() {
            let current = primary_key_of(&*parent.read())?;
            if current.as_ref() != Some(&key) {
                self.target = WeakRecord::new();
            }
        }
        self.key = Some(key);
        Ok(())
    }

    /// Returns the loaded parent as a linked record.
    #[must_use]
    pub fn linked(&self) -> Option<Box<dyn LinkedRecord>> {
        self.target
            .upgrade()
            .map(|parent| Box::new(parent) as Box<dyn LinkedRecord>)
    }
}

impl<P: Entity> Default for ManyToOne<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for ManyToOne<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            target: self.target.clone(),
        }
    }
}

impl<P> fmt::Debug for ManyToOne<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManyToOne")
            .field("type", &short_type_name::<P>())
            .field("key", &self.key)
            .field("loaded", &self.target.upgrade().is_some())
            .finish()
    }
}

/// The children of type `C` owned by a parent.
pub struct OneToMany<C> {
    records: Vec<Record<C>>,
}

impl<C: Entity> OneToMany<C> {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Appends a child.
    pub fn push(&mut self, child: Record<C>) {
        self.records.push(child);
    }

    /// Returns the children in insertion order.
    #[must_use]
    pub fn records(&self) -> &[Record<C>] {
        &self.records
    }

    /// Iterates over the children.
    pub fn iter(&self) -> std::slice::Iter<'_, Record<C>> {
        self.records.iter()
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if `child` is in the collection.
    #[must_use]
    pub fn contains(&self, child: &Record<C>) -> bool {
        self.records.iter().any(|r| r.ptr_eq(child))
    }

    /// Removes every child from the collection.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns the children as linked records.
    #[must_use]
    pub fn linked(&self) -> Vec<Box<dyn LinkedRecord>> {
        self.records
            .iter()
            .map(|child| Box::new(child.clone()) as Box<dyn LinkedRecord>)
            .collect()
    }
}

impl<C: Entity> Default for OneToMany<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for OneToMany<C> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for OneToMany<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.records).finish()
    }
}

impl<'a, C: Entity> IntoIterator for &'a OneToMany<C> {
    type Item = &'a Record<C>;
    type IntoIter = std::slice::Iter<'a, Record<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A record of any entity type, as seen across a relation.
///
/// The manager walks relations through this trait without knowing the
/// concrete type on the other side.
pub trait LinkedRecord: Send + Sync {
    /// Returns the entity name.
    fn entity_name(&self) -> &'static str;

    /// Returns the record's primary key.
    fn primary_key(&self) -> OrmResult<Option<Key>>;

    /// Saves the record.
    fn persist(&self, manager: &mut Manager) -> OrmResult<()>;

    /// Points the record's many-to-one `field` at the parent with `key`.
    fn attach(&self, field: &'static str, key: &Key) -> OrmResult<()>;

    /// Deletes the record and clears its many-to-one `field`.
    fn detach(&self, manager: &mut Manager, field: &'static str) -> OrmResult<bool>;
}

impl<T: Entity> LinkedRecord for Record<T> {
    fn entity_name(&self) -> &'static str {
        short_type_name::<T>()
    }

    fn primary_key(&self) -> OrmResult<Option<Key>> {
        primary_key_of(&*self.read())
    }

    fn persist(&self, manager: &mut Manager) -> OrmResult<()> {
        manager.save(self).map(|_| ())
    }

    fn attach(&self, field: &'static str, key: &Key) -> OrmResult<()> {
        self.write().set_value(field, key.to_value())
    }

    fn detach(&self, manager: &mut Manager, field: &'static str) -> OrmResult<bool> {
        let deleted = manager.delete(self)?;
        self.write().set_value(field, Value::Null)?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;
    use crate::metadata::ClassDescriptor;
    use crate::test_entities::Owner;

    #[derive(Debug, Default)]
    struct Unkeyed {
        name: String,
    }

    impl Entity for Unkeyed {
        fn class() -> ClassDescriptor {
            ClassDescriptor::new("Unkeyed").column::<String>("name")
        }

        fn get_value(&self, field: &str) -> OrmResult<Value> {
            match field {
                "name" => Ok(self.name.clone().into()),
                _ => Err(OrmError::unknown_field("Unkeyed", field)),
            }
        }

        fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
            match field {
                "name" => self.name = value.decode()?,
                _ => return Err(OrmError::unknown_field("Unkeyed", field)),
            }
            Ok(())
        }
    }

    #[test]
    fn linking_follows_the_parent_key() {
        let owner = Record::new(Owner::default());
        let mut link = ManyToOne::to(&owner).unwrap();
        assert!(link.is_set());
        assert_eq!(link.key().unwrap(), None);

        owner.write().id = Some(3);
        assert_eq!(link.key().unwrap(), Some(Key::Integer(3)));

        link.set_value(Value::Integer(4)).unwrap();
        assert!(link.target().is_none());
        assert_eq!(link.to_value().unwrap(), Value::Integer(4));

        link.set_value(Value::Null).unwrap();
        assert!(!link.is_set());
    }

    #[test]
    fn unreadable_parent_key_is_an_error() {
        let parent = Record::new(Unkeyed::default());
        assert!(matches!(
            ManyToOne::to(&parent),
            Err(OrmError::MissingIdField { .. })
        ));

        let mut link = ManyToOne::<Unkeyed>::new();
        assert!(link.set(&parent).is_err());
        assert!(!link.is_set());
    }
}
