//! The entity manager.

use crate::cache::Cache;
use crate::config::Config;
use crate::entity::{Entity, EntityClass};
use crate::error::{OrmError, OrmResult};
use crate::iter::LazyResults;
use crate::key::Key;
use crate::mapper;
use crate::metadata::{
    descriptor_of, primary_key_of, EntityDescriptor, FieldType, KeyStrategy, ManyToOneSpec,
};
use crate::record::Record;
use crate::relation::{LinkedRecord, ManyToOne};
use crate::sql::{ForeignKey, Probe, StatementBuilder};
use crate::stats::ManagerStats;
use minorm_driver::{Connection, ConnectionProvider, Dialect, FromValue, Row, Value};
use std::fmt;
use std::iter::Fuse;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The entry point for persisting entities.
///
/// A `Manager` owns one connection and an identity cache. It creates
/// tables and foreign keys from entity metadata, and saves, loads, merges
/// and deletes [`Record`]s.
///
/// # Example
///
/// ```rust,ignore
/// use minorm_core::{EntityClass, Manager, Record};
/// use minorm_driver::SqliteProvider;
///
/// let mut manager = Manager::connect(&SqliteProvider::in_memory())?;
/// let classes = [EntityClass::of::<Publisher>(), EntityClass::of::<Book>()];
/// manager.register(&classes)?;
/// manager.create_relationships(&classes)?;
///
/// let book = Record::new(Book::new("Dune"));
/// manager.save(&book)?;
/// let found = manager.get_by_id::<Book>(book.read().id.unwrap())?;
/// assert!(found.ptr_eq(&book));
/// ```
///
/// # Concurrency
///
/// Every operation takes `&mut self` and runs to completion on the calling
/// thread. Share a manager between threads only behind a lock.
pub struct Manager {
    /// The live connection.
    conn: Box<dyn Connection>,
    /// SQL for the connection's dialect.
    builder: StatementBuilder,
    /// Loaded records by type and key.
    cache: Cache,
    /// Statement and cache counters.
    stats: ManagerStats,
    /// Behaviour switches.
    config: Config,
}

impl Manager {
    /// Creates a manager over `conn` with the default configuration.
    #[must_use]
    pub fn new(conn: Box<dyn Connection>) -> Self {
        Self::with_config(conn, Config::default())
    }

    /// Creates a manager over `conn` with a custom configuration.
    #[must_use]
    pub fn with_config(conn: Box<dyn Connection>, config: Config) -> Self {
        let builder = StatementBuilder::new(conn.dialect());
        Self {
            conn,
            builder,
            cache: Cache::new(),
            stats: ManagerStats::new(),
            config,
        }
    }

    /// Creates a manager over a connection from `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot open a connection.
    pub fn connect(provider: &dyn ConnectionProvider) -> OrmResult<Self> {
        Ok(Self::new(provider.get_connection()?))
    }

    /// Returns the connection's SQL dialect.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.builder.dialect()
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the statistics.
    #[must_use]
    pub const fn stats(&self) -> &ManagerStats {
        &self.stats
    }

    /// Returns the identity cache.
    #[must_use]
    pub const fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Empties the identity cache.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    // ========================================================================
    // Schema
    // ========================================================================

    /// Creates the table of every listed entity that does not have one yet.
    ///
    /// All descriptors and relations are validated before any table is
    /// created. Returns the number of tables created; registering the same
    /// classes again creates none.
    ///
    /// # Errors
    ///
    /// Returns metadata errors for malformed entities and database errors
    /// from the DDL.
    pub fn register(&mut self, classes: &[EntityClass]) -> OrmResult<usize> {
        let mut descriptors = Vec::with_capacity(classes.len());
        for class in classes {
            let descriptor = class.descriptor()?;
            descriptor.validate_relations()?;
            descriptors.push(descriptor);
        }

        let mut created = 0;
        for descriptor in &descriptors {
            if self.create_table(descriptor)? {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Registers a single entity type. Returns true if its table was created.
    pub fn register_entity<T: Entity>(&mut self) -> OrmResult<bool> {
        Ok(self.register(&[EntityClass::of::<T>()])? == 1)
    }

    fn create_table(&mut self, d: &EntityDescriptor) -> OrmResult<bool> {
        if self.table_exists(&d.table)? {
            debug!(entity = d.name, table = %d.table, "table already exists");
            return Ok(false);
        }
        let sql = self.builder.create_table(d)?;
        self.ddl(&sql)?;
        info!(entity = d.name, table = %d.table, "created table");
        Ok(true)
    }

    /// Adds the foreign key of every many-to-one relation of the listed
    /// entities that does not have one yet.
    ///
    /// Call after [`register`](Self::register) so that every participating
    /// table exists. Returns the number of constraints added.
    pub fn create_relationships(&mut self, classes: &[EntityClass]) -> OrmResult<usize> {
        let mut created = 0;
        for class in classes {
            let child = class.descriptor()?;
            for relation in &child.many_to_one {
                let parent = relation.target.descriptor()?;
                if self.add_foreign_key(&child, relation, &parent)? {
                    created += 1;
                }
            }
        }
        Ok(created)
    }

    fn add_foreign_key(
        &mut self,
        child: &EntityDescriptor,
        relation: &ManyToOneSpec,
        parent: &EntityDescriptor,
    ) -> OrmResult<bool> {
        let probe = self
            .builder
            .foreign_key_exists(&child.table, relation.join_column, &parent.table);
        if self.probe(&probe)? {
            debug!(
                table = %child.table,
                column = relation.join_column,
                "foreign key already exists"
            );
            return Ok(false);
        }

        let fk = self.builder.foreign_key(relation, parent);
        let existing = match self.builder.foreign_keys_of(&child.table) {
            Some(probe) => self.foreign_keys(&probe)?,
            None => Vec::new(),
        };
        let statements = self.builder.add_foreign_key(child, &fk, &existing)?;
        match self.dialect() {
            Dialect::MySql => statements.iter().try_for_each(|sql| self.ddl(sql))?,
            Dialect::Sqlite => self.rebuild(&statements)?,
        }

        info!(
            table = %child.table,
            column = relation.join_column,
            references = %parent.table,
            "added foreign key"
        );
        Ok(true)
    }

    /// Runs a table rebuild with foreign-key enforcement off.
    fn rebuild(&mut self, statements: &[String]) -> OrmResult<()> {
        let enforced = self.count("PRAGMA foreign_keys", &[])? != 0;
        self.conn.execute("PRAGMA foreign_keys = OFF", &[])?;
        let result = statements.iter().try_for_each(|sql| self.ddl(sql));
        if enforced {
            self.conn.execute("PRAGMA foreign_keys = ON", &[])?;
        }
        result
    }

    fn foreign_keys(&mut self, probe: &Probe) -> OrmResult<Vec<ForeignKey>> {
        self.stats.record_query();
        let mut cursor = self.conn.query(probe.sql, &probe.params)?;
        let mut keys = Vec::new();
        while let Some(row) = cursor.next_row()? {
            keys.push(ForeignKey {
                column: text_at(&row, 0)?,
                parent_table: text_at(&row, 1)?,
                parent_column: text_at(&row, 2)?,
            });
        }
        cursor.close();
        Ok(keys)
    }

    /// Returns true if `table` exists.
    pub fn table_exists(&mut self, table: &str) -> OrmResult<bool> {
        let probe = self.builder.table_exists(table);
        self.probe(&probe)
    }

    /// Drops the table of `T` and evicts its cached records.
    ///
    /// A missing table is not an error; returns false in that case.
    pub fn drop_entity<T: Entity>(&mut self) -> OrmResult<bool> {
        let d = descriptor_of::<T>()?;
        if !self.table_exists(&d.table)? {
            warn!(entity = d.name, table = %d.table, "table does not exist, nothing to drop");
            return Ok(false);
        }
        let sql = self.builder.drop_table(&d);
        self.ddl(&sql)?;
        let evicted = self.cache.clear_type::<T>();
        info!(entity = d.name, table = %d.table, evicted, "dropped table");
        Ok(true)
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Saves `record` and returns it.
    ///
    /// An unsaved record is inserted after its unsaved parents, and receives
    /// its generated or assigned key. A saved record is merged if its row
    /// exists; a record with an assigned key and no row is inserted. Either
    /// way the record's children are then saved, pointing back at it.
    ///
    /// # Errors
    ///
    /// `NotFound` if a record with a database-generated key has no row.
    pub fn save<T: Entity>(&mut self, record: &Record<T>) -> OrmResult<Record<T>> {
        let d = descriptor_of::<T>()?;
        let key = primary_key_of(&*record.read())?;
        match key {
            None => self.insert_new(record, &d)?,
            Some(key) => {
                if self.row_exists(&d, &key)? {
                    self.save_parents(record, &d)?;
                    self.merge(record)?;
                } else if d.primary_key.strategy == KeyStrategy::Assigned {
                    self.save_parents(record, &d)?;
                    self.insert_row(record, &d)?;
                } else {
                    return Err(OrmError::not_found(d.name, key));
                }
            }
        }
        self.save_children(record, &d)?;
        Ok(record.clone())
    }

    /// Alias for [`save`](Self::save).
    pub fn persist<T: Entity>(&mut self, record: &Record<T>) -> OrmResult<Record<T>> {
        self.save(record)
    }

    fn insert_new<T: Entity>(&mut self, record: &Record<T>, d: &EntityDescriptor) -> OrmResult<()> {
        self.save_parents(record, d)?;
        // A parent's cascade may already have saved this record.
        if primary_key_of(&*record.read())?.is_some() {
            return Ok(());
        }
        let pk = &d.primary_key;
        if pk.strategy == KeyStrategy::Assigned {
            if pk.field_type != FieldType::Uuid {
                return Err(OrmError::invalid_operation(format!(
                    "{} must be given a key before it is saved",
                    d.name
                )));
            }
            record
                .write()
                .set_value(pk.field, Value::Uuid(Uuid::new_v4()))?;
        }
        self.insert_row(record, d)
    }

    fn insert_row<T: Entity>(&mut self, record: &Record<T>, d: &EntityDescriptor) -> OrmResult<()> {
        let statement = self.builder.insert(d);
        let params = mapper::bind(&*record.read(), &statement)?;
        self.stats.record_insert();
        let generated = self.conn.insert(&statement.sql, &params)?;
        if d.primary_key.strategy == KeyStrategy::AutoIncrement {
            let id = generated.ok_or_else(|| {
                OrmError::invalid_operation(format!("no key was generated for {}", d.name))
            })?;
            record
                .write()
                .set_value(d.primary_key.field, Value::Integer(id))?;
        }
        let key = self.cache_put(record)?;
        debug!(entity = d.name, key = ?key, "inserted");
        Ok(())
    }

    fn save_parents<T: Entity>(&mut self, record: &Record<T>, d: &EntityDescriptor) -> OrmResult<()> {
        for relation in &d.many_to_one {
            let parent = record.read().parent(relation.field)?;
            if let Some(parent) = parent {
                if parent.primary_key()?.is_none() {
                    debug!(entity = d.name, parent = parent.entity_name(), "saving parent first");
                    parent.persist(self)?;
                }
            }
        }
        Ok(())
    }

    fn save_children<T: Entity>(&mut self, record: &Record<T>, d: &EntityDescriptor) -> OrmResult<()> {
        if d.one_to_many.is_empty() {
            return Ok(());
        }
        let Some(key) = primary_key_of(&*record.read())? else {
            return Ok(());
        };
        for relation in &d.one_to_many {
            let children = record.read().children(relation.field)?;
            for child in &children {
                child.attach(relation.mapped_by, &key)?;
                child.persist(self)?;
            }
        }
        Ok(())
    }

    /// Writes every column of a saved record to its row.
    ///
    /// Returns true if exactly one row changed; the cached entry is then
    /// refreshed to this record.
    ///
    /// # Errors
    ///
    /// `NotPersisted` if the record has no key.
    pub fn merge<T: Entity>(&mut self, record: &Record<T>) -> OrmResult<bool> {
        let d = descriptor_of::<T>()?;
        let Some(key) = primary_key_of(&*record.read())? else {
            return Err(OrmError::not_persisted(d.name));
        };
        let merged = match self.builder.update(&d) {
            Some(statement) => {
                let params = mapper::bind(&*record.read(), &statement)?;
                self.stats.record_update();
                self.conn.execute(&statement.sql, &params)? == 1
            }
            // Nothing but the key is stored.
            None => self.row_exists(&d, &key)?,
        };
        if merged {
            self.cache_put(record)?;
        }
        debug!(entity = d.name, %key, merged, "merged");
        Ok(merged)
    }

    /// Reloads `record` from its row, discarding unsaved changes.
    ///
    /// # Errors
    ///
    /// `NotPersisted` if the record has no key; `NotFound` if its row is gone.
    pub fn update<T: Entity>(&mut self, record: &Record<T>) -> OrmResult<Record<T>> {
        let d = descriptor_of::<T>()?;
        let key = primary_key_of(&*record.read())?.ok_or_else(|| OrmError::not_persisted(d.name))?;
        let sql = self.builder.select_by_id(&d);
        let Some(row) = self.fetch_one(&sql, &[key.to_value()])? else {
            return Err(OrmError::not_found(d.name, key));
        };
        mapper::decode_into(&mut *record.write(), &row, &d)?;
        self.cache_put(record)?;
        debug!(entity = d.name, %key, "reloaded");
        Ok(record.clone())
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Loads the record of `T` with `key`, from the cache if possible.
    ///
    /// Returns `None` if no row has that key.
    pub fn find_by_id<T: Entity>(&mut self, key: impl Into<Key>) -> OrmResult<Option<Record<T>>> {
        let d = descriptor_of::<T>()?;
        let key = key.into().coerce(&d.primary_key.field_type)?;
        if self.config.cache_enabled {
            if let Some(hit) = self.cache.get::<T>(&key) {
                self.stats.record_cache_hit();
                debug!(entity = d.name, %key, "cache hit");
                return Ok(Some(hit));
            }
            self.stats.record_cache_miss();
        }
        let sql = self.builder.select_by_id(&d);
        let Some(row) = self.fetch_one(&sql, &[key.to_value()])? else {
            return Ok(None);
        };
        let record = Record::new(mapper::decode::<T>(&row, &d)?);
        self.cache_put(&record)?;
        Ok(Some(record))
    }

    /// Loads the record of `T` with `key`.
    ///
    /// # Errors
    ///
    /// `NotFound` if no row has that key.
    pub fn get_by_id<T: Entity>(&mut self, key: impl Into<Key>) -> OrmResult<Record<T>> {
        let key = key.into();
        let shown = key.to_string();
        match self.find_by_id::<T>(key)? {
            Some(record) => Ok(record),
            None => Err(OrmError::not_found(descriptor_of::<T>()?.name, shown)),
        }
    }

    /// Loads every record of `T`.
    pub fn find_all<T: Entity>(&mut self) -> OrmResult<Vec<Record<T>>> {
        self.find_all_as_iterable::<T>()?.collect()
    }

    /// Returns every record of `T` as a lazy, single-pass iterator.
    pub fn find_all_as_iterable<T: Entity>(&mut self) -> OrmResult<LazyResults<'_, T>> {
        let d = descriptor_of::<T>()?;
        let sql = self.builder.select_all(&d);
        self.stats.record_query();
        let cursor = self.conn.query(&sql, &[])?;
        Ok(LazyResults::new(
            cursor,
            d,
            &mut self.cache,
            &self.stats,
            self.config.cache_enabled,
        ))
    }

    /// Returns every record of `T` as a stream that ends after the first
    /// error.
    pub fn find_all_as_stream<T: Entity>(&mut self) -> OrmResult<Fuse<LazyResults<'_, T>>> {
        Ok(self.find_all_as_iterable::<T>()?.fuse())
    }

    /// Returns the parent `link` points at: the linked record if it is
    /// loaded, else the record with the link's key.
    pub fn resolve<P: Entity>(&mut self, link: &ManyToOne<P>) -> OrmResult<Option<Record<P>>> {
        if let Some(parent) = link.target() {
            return Ok(Some(parent));
        }
        match link.key()? {
            Some(key) => self.find_by_id::<P>(key),
            None => Ok(None),
        }
    }

    /// Returns true if the row of `record` exists.
    pub fn exists<T: Entity>(&mut self, record: &Record<T>) -> OrmResult<bool> {
        let d = descriptor_of::<T>()?;
        match primary_key_of(&*record.read())? {
            Some(key) => self.row_exists(&d, &key),
            None => Ok(false),
        }
    }

    /// Returns true if a row of `T` has `key`.
    pub fn exists_by_id<T: Entity>(&mut self, key: impl Into<Key>) -> OrmResult<bool> {
        let d = descriptor_of::<T>()?;
        let key = key.into().coerce(&d.primary_key.field_type)?;
        self.row_exists(&d, &key)
    }

    /// Returns true if the record of `T` with `key` is cached.
    pub fn is_record_in_cache<T: Entity>(&self, key: impl Into<Key>) -> OrmResult<bool> {
        let d = descriptor_of::<T>()?;
        let key = key.into().coerce(&d.primary_key.field_type)?;
        Ok(self.cache.contains::<T>(&key))
    }

    // ========================================================================
    // Deleting
    // ========================================================================

    /// Deletes the row of `record`.
    ///
    /// Returns false, doing nothing, if the record has no key or no row.
    /// Otherwise the record's children are deleted first: each loses its
    /// key and its link back to the record, and the record's collections
    /// are emptied. Child rows that were never loaded are swept as well.
    /// The record is then deleted, evicted from the cache, and its key is
    /// cleared. Other fields keep their values.
    pub fn delete<T: Entity>(&mut self, record: &Record<T>) -> OrmResult<bool> {
        let d = descriptor_of::<T>()?;
        let Some(key) = primary_key_of(&*record.read())? else {
            return Ok(false);
        };
        if !self.row_exists(&d, &key)? {
            debug!(entity = d.name, %key, "no row to delete");
            return Ok(false);
        }

        if self.config.cascade_delete {
            for relation in &d.one_to_many {
                let children = record.read().children(relation.field)?;
                for child in &children {
                    child.detach(self, relation.mapped_by)?;
                }
                record.write().clear_children(relation.field)?;
                let swept = if self.config.sweep_orphans {
                    (relation.cascade)(self, relation.mapped_by, &key)?
                } else {
                    0
                };
                debug!(
                    entity = d.name,
                    relation = relation.field,
                    loaded = children.len(),
                    swept,
                    "cascaded delete"
                );
            }
        }

        let statement = self.builder.delete(&d);
        self.stats.record_delete();
        self.conn.execute(&statement.sql, &[key.to_value()])?;
        self.cache.evict::<T>(&key);
        record.write().set_value(d.primary_key.field, Value::Null)?;
        debug!(entity = d.name, %key, "deleted");
        Ok(true)
    }

    /// Deletes the stored children of type `C` whose `mapped_by` field
    /// references `parent`. Returns how many were deleted.
    pub(crate) fn sweep_children<C: Entity>(
        &mut self,
        mapped_by: &'static str,
        parent: &Key,
    ) -> OrmResult<usize> {
        let d = descriptor_of::<C>()?;
        let relation = d
            .many_to_one_field(mapped_by)
            .ok_or_else(|| OrmError::unknown_field(d.name, mapped_by))?;
        let sql = self.builder.select_by_parent(&d, relation);
        self.stats.record_query();
        let cursor = self.conn.query(&sql, &[parent.to_value()])?;
        let use_cache = self.config.cache_enabled;
        let children: Vec<Record<C>> =
            LazyResults::new(cursor, d, &mut self.cache, &self.stats, use_cache)
                .collect::<OrmResult<_>>()?;

        let mut removed = 0;
        for child in &children {
            if child.detach(self, mapped_by)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn cache_put<T: Entity>(&mut self, record: &Record<T>) -> OrmResult<Option<Key>> {
        if self.config.cache_enabled {
            self.cache.put(record)
        } else {
            primary_key_of(&*record.read())
        }
    }

    fn row_exists(&mut self, d: &EntityDescriptor, key: &Key) -> OrmResult<bool> {
        let sql = self.builder.exists(d);
        Ok(self.count(&sql, &[key.to_value()])? > 0)
    }

    fn probe(&mut self, probe: &Probe) -> OrmResult<bool> {
        Ok(self.count(probe.sql, &probe.params)? > 0)
    }

    fn count(&mut self, sql: &str, params: &[Value]) -> OrmResult<i64> {
        match self.fetch_one(sql, params)? {
            Some(row) => match row.get_at(0) {
                Some(value) => Ok(i64::from_value(value.clone())?),
                None => Ok(0),
            },
            None => Ok(0),
        }
    }

    fn fetch_one(&mut self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        self.stats.record_query();
        let mut cursor = self.conn.query(sql, params)?;
        let row = cursor.next_row();
        cursor.close();
        Ok(row?)
    }

    fn ddl(&mut self, sql: &str) -> OrmResult<()> {
        self.stats.record_ddl();
        self.conn.execute(sql, &[])?;
        Ok(())
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("dialect", &self.dialect())
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn text_at(row: &Row, index: usize) -> OrmResult<String> {
    let value = row.get_at(index).cloned().unwrap_or(Value::Null);
    Ok(String::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_entities::{Badge, Owner, Pet, Stub, Ticket};
    use minorm_driver::SqliteConnection;

    fn manager() -> Manager {
        let conn = SqliteConnection::open_in_memory().unwrap();
        let mut manager = Manager::new(Box::new(conn));
        let classes = [
            EntityClass::of::<Owner>(),
            EntityClass::of::<Pet>(),
            EntityClass::of::<Badge>(),
        ];
        manager.register(&classes).unwrap();
        manager.create_relationships(&classes).unwrap();
        manager
    }

    fn pet(name: &str) -> Record<Pet> {
        Record::new(Pet {
            name: name.to_string(),
            ..Pet::default()
        })
    }

    #[test]
    fn ddl_is_idempotent() {
        let mut m = manager();
        let classes = [EntityClass::of::<Owner>(), EntityClass::of::<Pet>()];
        assert_eq!(m.register(&classes).unwrap(), 0);
        assert_eq!(m.create_relationships(&classes).unwrap(), 0);
        assert!(m.table_exists("pets").unwrap());
    }

    #[test]
    fn save_assigns_keys_and_caches() {
        let mut m = manager();
        let rex = pet("Rex");
        m.save(&rex).unwrap();
        let id = rex.read().id.unwrap();

        let before = m.stats().snapshot();
        let found = m.get_by_id::<Pet>(id).unwrap();
        assert!(found.ptr_eq(&rex));
        assert_eq!(m.stats().snapshot().queries, before.queries);
    }

    #[test]
    fn uuid_keys_are_generated() {
        let mut m = manager();
        let badge = Record::new(Badge {
            label: "gold".into(),
            level: 3,
            ..Badge::default()
        });
        m.save(&badge).unwrap();
        let id = badge.read().id.unwrap();
        m.clear_cache();

        let loaded = m.get_by_id::<Badge>(id).unwrap();
        assert!(!loaded.ptr_eq(&badge));
        assert_eq!(loaded.read().label, "gold");
        assert_eq!(loaded.read().level, 3);
    }

    #[test]
    fn saving_an_unknown_generated_key_fails() {
        let mut m = manager();
        let ghost = Record::new(Pet {
            id: Some(404),
            ..Pet::default()
        });
        assert!(m.save(&ghost).unwrap_err().is_not_found());
    }

    #[test]
    fn children_point_at_their_parent() {
        let mut m = manager();
        let owner = Record::new(Owner {
            name: "Ann".into(),
            ..Owner::default()
        });
        let rex = pet("Rex");
        owner.write().pets.push(rex.clone());
        m.save(&owner).unwrap();

        let owner_id = owner.read().id.unwrap();
        assert!(rex.read().id.is_some());
        assert_eq!(rex.read().owner.key().unwrap(), Some(Key::Integer(owner_id)));
    }

    #[test]
    fn key_only_parents_save_and_merge() {
        let mut m = manager();
        let classes = [EntityClass::of::<Ticket>(), EntityClass::of::<Stub>()];
        m.register(&classes).unwrap();
        m.create_relationships(&classes).unwrap();

        let ticket = Record::new(Ticket::default());
        m.save(&ticket).unwrap();
        let id = ticket.read().id.unwrap();
        assert!(m.exists_by_id::<Ticket>(id).unwrap());

        let stub = Record::new(Stub::default());
        ticket.write().stubs.push(stub.clone());
        m.save(&ticket).unwrap();
        assert_eq!(stub.read().ticket.key().unwrap(), Some(Key::Integer(id)));
        assert!(m.merge(&ticket).unwrap());
        assert_eq!(m.stats().snapshot().updates, 0);

        m.clear_cache();
        let loaded = m.get_by_id::<Stub>(stub.read().id.unwrap()).unwrap();
        assert_eq!(loaded.read().ticket.key().unwrap(), Some(Key::Integer(id)));

        assert!(m.delete(&ticket).unwrap());
        assert!(!m.merge(&Record::new(Ticket { id: Some(id), ..Ticket::default() })).unwrap());
    }

    #[test]
    fn saving_a_child_saves_its_parent() {
        let mut m = manager();
        let owner = Record::new(Owner {
            name: "Bo".into(),
            ..Owner::default()
        });
        let rex = pet("Rex");
        rex.write().owner = ManyToOne::to(&owner).unwrap();
        m.save(&rex).unwrap();

        assert!(owner.read().id.is_some());
        assert!(m.exists(&owner).unwrap());
        let link = rex.read().owner.clone();
        let resolved = m.resolve(&link).unwrap().unwrap();
        assert!(resolved.ptr_eq(&owner));
    }

    #[test]
    fn delete_cascades_and_sweeps() {
        let mut m = manager();
        let owner = Record::new(Owner {
            name: "Cy".into(),
            ..Owner::default()
        });
        let loaded = pet("Rex");
        owner.write().pets.push(loaded.clone());
        m.save(&owner).unwrap();
        let owner_id = owner.read().id.unwrap();

        // A child the owner's collection does not know about.
        let stray = Record::new(Pet {
            name: "Tom".into(),
            owner: ManyToOne::with_key(owner_id),
            ..Pet::default()
        });
        m.save(&stray).unwrap();
        let stray_id = stray.read().id.unwrap();

        assert!(m.delete(&owner).unwrap());
        assert!(owner.read().id.is_none());
        assert!(owner.read().pets.is_empty());
        assert!(loaded.read().id.is_none());
        assert!(!loaded.read().owner.is_set());
        assert_eq!(loaded.read().name, "Rex");
        assert!(!m.exists_by_id::<Pet>(stray_id).unwrap());
        assert!(!m.is_record_in_cache::<Pet>(stray_id).unwrap());
        assert!(!m.exists_by_id::<Owner>(owner_id).unwrap());
    }

    #[test]
    fn delete_without_row_is_a_no_op() {
        let mut m = manager();
        assert!(!m.delete(&pet("unsaved")).unwrap());
    }

    #[test]
    fn merge_and_update() {
        let mut m = manager();
        let rex = pet("Rex");
        m.save(&rex).unwrap();

        rex.write().name = "Max".into();
        assert!(m.merge(&rex).unwrap());

        rex.write().name = "local only".into();
        m.update(&rex).unwrap();
        assert_eq!(rex.read().name, "Max");
        assert!(matches!(
            m.merge(&pet("new")),
            Err(OrmError::NotPersisted { .. })
        ));
    }

    #[test]
    fn drop_entity_twice() {
        let mut m = manager();
        m.save(&Record::new(Badge::default())).unwrap();
        assert!(m.drop_entity::<Badge>().unwrap());
        assert_eq!(m.cache().count_all::<Badge>(), 0);
        assert!(!m.drop_entity::<Badge>().unwrap());
    }
}
