//! Connection and provider traits.

use crate::error::DriverResult;
use crate::row::Cursor;
use crate::value::Value;
use std::fmt;

/// The SQL dialect a connection speaks.
///
/// Statement generation is shared between dialects except for primary-key
/// declarations, schema introspection and foreign-key creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// MySQL / MariaDB, with `information_schema` and `AUTO_INCREMENT`.
    MySql,
    /// SQLite, with `sqlite_master` and `AUTOINCREMENT`.
    Sqlite,
}

impl Dialect {
    /// Returns the dialect name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A live database connection.
///
/// Statements use positional `?` placeholders; `params` are bound in order.
/// All calls block until the database answers. Implementations are not
/// required to be shareable between threads, only movable.
///
/// # Implementors
///
/// - [`super::SqliteConnection`] - SQLite through `rusqlite`
pub trait Connection: Send {
    /// Returns the dialect this connection speaks.
    fn dialect(&self) -> Dialect;

    /// Executes a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails to prepare or execute.
    fn execute(&mut self, sql: &str, params: &[Value]) -> DriverResult<usize>;

    /// Executes an `INSERT` and returns the key generated for it, if the
    /// table generated one.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails to prepare or execute.
    fn insert(&mut self, sql: &str, params: &[Value]) -> DriverResult<Option<i64>>;

    /// Runs a query and returns a cursor over its rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails to prepare or execute.
    fn query(&mut self, sql: &str, params: &[Value]) -> DriverResult<Box<dyn Cursor>>;
}

/// Hands out live connections.
///
/// Pooling and configuration loading live behind this trait.
pub trait ConnectionProvider {
    /// Returns a live connection.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be established.
    fn get_connection(&self) -> DriverResult<Box<dyn Connection>>;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> DriverResult<usize> {
        (**self).execute(sql, params)
    }

    fn insert(&mut self, sql: &str, params: &[Value]) -> DriverResult<Option<i64>> {
        (**self).insert(sql, params)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> DriverResult<Box<dyn Cursor>> {
        (**self).query(sql, params)
    }
}
