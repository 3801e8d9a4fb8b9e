//! Identity cache.
//!
//! Holds at most one record per entity type and primary key, so that
//! loading the same row twice yields the same [`Record`] handle while it is
//! cached. The cache is opportunistic; the database stays authoritative.

use crate::entity::Entity;
use crate::error::OrmResult;
use crate::key::Key;
use crate::metadata::primary_key_of;
use crate::record::Record;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

type Bucket<T> = HashMap<Key, Record<T>>;

/// A bucket of records of one type.
trait AnyBucket: Send + Sync {
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Entity> AnyBucket for Bucket<T> {
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Records keyed by entity type and primary key.
#[derive(Default)]
pub struct Cache {
    buckets: HashMap<TypeId, Box<dyn AnyBucket>>,
}

impl Cache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket<T: Entity>(&self) -> Option<&Bucket<T>> {
        self.buckets
            .get(&TypeId::of::<T>())
            .and_then(|b| b.as_any().downcast_ref())
    }

    fn bucket_mut<T: Entity>(&mut self) -> Option<&mut Bucket<T>> {
        self.buckets
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Bucket::<T>::new()))
            .as_any_mut()
            .downcast_mut()
    }

    /// Caches `record` under its primary key, replacing any previous entry.
    ///
    /// Returns the key, or `None` if the record has no key and was not cached.
    pub fn put<T: Entity>(&mut self, record: &Record<T>) -> OrmResult<Option<Key>> {
        let Some(key) = primary_key_of(&*record.read())? else {
            return Ok(None);
        };
        if let Some(bucket) = self.bucket_mut::<T>() {
            bucket.insert(key.clone(), record.clone());
        }
        Ok(Some(key))
    }

    /// Returns the cached record with `key`.
    #[must_use]
    pub fn get<T: Entity>(&self, key: &Key) -> Option<Record<T>> {
        self.bucket::<T>().and_then(|b| b.get(key)).cloned()
    }

    /// Returns true if a record with `key` is cached.
    #[must_use]
    pub fn contains<T: Entity>(&self, key: &Key) -> bool {
        self.bucket::<T>().is_some_and(|b| b.contains_key(key))
    }

    /// Removes `record` if it is the cached entry for its key.
    pub fn remove<T: Entity>(&mut self, record: &Record<T>) -> OrmResult<bool> {
        let Some(key) = primary_key_of(&*record.read())? else {
            return Ok(false);
        };
        let Some(bucket) = self.bucket_mut::<T>() else {
            return Ok(false);
        };
        if bucket.get(&key).is_some_and(|cached| cached.ptr_eq(record)) {
            bucket.remove(&key);
            return Ok(true);
        }
        Ok(false)
    }

    /// Removes the entry for `key`, returning it.
    pub fn evict<T: Entity>(&mut self, key: &Key) -> Option<Record<T>> {
        self.bucket_mut::<T>().and_then(|b| b.remove(key))
    }

    /// Returns the number of cached records of type `T`.
    #[must_use]
    pub fn count_all<T: Entity>(&self) -> usize {
        self.bucket::<T>().map_or(0, HashMap::len)
    }

    /// Returns every cached record of type `T`, in no particular order.
    #[must_use]
    pub fn all_of<T: Entity>(&self) -> Vec<Record<T>> {
        self.bucket::<T>()
            .map(|b| b.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Removes every record of type `T`, returning how many were cached.
    pub fn clear_type<T: Entity>(&mut self) -> usize {
        self.buckets
            .remove(&TypeId::of::<T>())
            .map_or(0, |b| b.len())
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Returns the number of cached records of all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("types", &self.buckets.len())
            .field("records", &self.len())
            .finish_non_exhaustive()
    }
}
