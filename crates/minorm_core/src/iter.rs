//! Lazy query results.

use crate::cache::Cache;
use crate::entity::Entity;
use crate::error::OrmResult;
use crate::mapper;
use crate::metadata::EntityDescriptor;
use crate::record::Record;
use crate::stats::ManagerStats;
use minorm_driver::{Cursor, Row};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A forward-only, single-pass view over the rows of a query.
///
/// Each row is decoded only when it is reached. Rows whose key is already
/// cached yield the cached record, so the same row always comes back as the
/// same handle. The cursor is released when the results are exhausted, on
/// the first error, on [`close`](LazyResults::close) and on drop.
pub struct LazyResults<'a, T> {
    cursor: Option<Box<dyn Cursor>>,
    descriptor: Arc<EntityDescriptor>,
    cache: &'a mut Cache,
    stats: &'a ManagerStats,
    use_cache: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> LazyResults<'a, T> {
    pub(crate) fn new(
        cursor: Box<dyn Cursor>,
        descriptor: Arc<EntityDescriptor>,
        cache: &'a mut Cache,
        stats: &'a ManagerStats,
        use_cache: bool,
    ) -> Self {
        Self {
            cursor: Some(cursor),
            descriptor,
            cache,
            stats,
            use_cache,
            _marker: PhantomData,
        }
    }

    /// Returns the next record, or `None` once the rows are exhausted.
    pub fn advance(&mut self) -> OrmResult<Option<Record<T>>> {
        let next = match self.cursor.as_mut() {
            Some(cursor) => cursor.next_row(),
            None => return Ok(None),
        };
        let row = match next {
            Ok(Some(row)) => row,
            Ok(None) => {
                self.close();
                return Ok(None);
            }
            Err(e) => {
                self.close();
                return Err(e.into());
            }
        };
        match self.materialize(&row) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    fn materialize(&mut self, row: &Row) -> OrmResult<Record<T>> {
        if self.use_cache {
            if let Some(key) = mapper::row_key(row, &self.descriptor)? {
                if let Some(hit) = self.cache.get::<T>(&key) {
                    self.stats.record_cache_hit();
                    return Ok(hit);
                }
                self.stats.record_cache_miss();
            }
        }
        let record = Record::new(mapper::decode::<T>(row, &self.descriptor)?);
        if self.use_cache {
            self.cache.put(&record)?;
        }
        Ok(record)
    }

    /// Releases the cursor. Later calls to [`advance`](Self::advance) yield
    /// `None`.
    pub fn close(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
        }
    }

    /// Returns true once the cursor has been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }
}

impl<T: Entity> Iterator for LazyResults<'_, T> {
    type Item = OrmResult<Record<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}

impl<T> Drop for LazyResults<'_, T> {
    fn drop(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
        }
    }
}

impl<T> fmt::Debug for LazyResults<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyResults")
            .field("entity", &self.descriptor.name)
            .field("open", &self.cursor.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::descriptor_of;
    use crate::test_entities::Owner;
    use minorm_driver::{BufferedCursor, Value};

    fn cursor(rows: Vec<Vec<Value>>) -> Box<dyn Cursor> {
        Box::new(BufferedCursor::new(vec!["id".into(), "name".into()], rows))
    }

    #[test]
    fn yields_rows_then_closes() {
        let mut cache = Cache::new();
        let stats = ManagerStats::new();
        let d = descriptor_of::<Owner>().unwrap();
        let rows = vec![
            vec![Value::Integer(1), Value::from("a")],
            vec![Value::Integer(2), Value::from("b")],
        ];
        let mut results = LazyResults::<Owner>::new(cursor(rows), d, &mut cache, &stats, true);

        let first = results.advance().unwrap().unwrap();
        assert_eq!(first.read().name, "a");
        assert!(!results.is_closed());
        assert!(results.advance().unwrap().is_some());
        assert!(results.advance().unwrap().is_none());
        assert!(results.is_closed());
        drop(results);

        assert_eq!(cache.count_all::<Owner>(), 2);
        assert_eq!(stats.cache_misses(), 2);
    }

    #[test]
    fn cached_rows_keep_identity() {
        let mut cache = Cache::new();
        let stats = ManagerStats::new();
        let d = descriptor_of::<Owner>().unwrap();
        let known = Record::new(Owner {
            id: Some(5),
            name: "kept".into(),
            ..Owner::default()
        });
        cache.put(&known).unwrap();

        let rows = vec![vec![Value::Integer(5), Value::from("stale")]];
        let found: Vec<_> = LazyResults::<Owner>::new(cursor(rows), d, &mut cache, &stats, true)
            .collect::<OrmResult<_>>()
            .unwrap();
        assert!(found[0].ptr_eq(&known));
        assert_eq!(known.read().name, "kept");
        assert_eq!(stats.cache_hits(), 1);
    }

    #[test]
    fn decode_errors_stop_iteration() {
        let mut cache = Cache::new();
        let stats = ManagerStats::new();
        let d = descriptor_of::<Owner>().unwrap();
        let rows = vec![
            vec![Value::from("x"), Value::from("bad key")],
            vec![Value::Integer(2), Value::from("b")],
        ];
        let mut results = LazyResults::<Owner>::new(cursor(rows), d, &mut cache, &stats, true);
        assert!(results.next().unwrap().is_err());
        assert!(results.is_closed());
        assert!(results.next().is_none());
    }
}
