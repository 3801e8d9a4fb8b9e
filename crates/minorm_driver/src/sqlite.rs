//! SQLite driver built on `rusqlite`.

use crate::config::SqliteConfig;
use crate::connection::{Connection, ConnectionProvider, Dialect};
use crate::error::{DriverError, DriverResult};
use crate::row::{BufferedCursor, Cursor};
use crate::value::{Value, DATETIME_FORMAT, DATE_FORMAT};
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, OpenFlags, ToSql};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(SqlValue::Null),
            Self::Integer(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Self::Real(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            Self::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Self::Boolean(v) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*v))),
            Self::Date(v) => ToSqlOutput::Owned(SqlValue::Text(v.format(DATE_FORMAT).to_string())),
            Self::DateTime(v) => {
                ToSqlOutput::Owned(SqlValue::Text(v.format(DATETIME_FORMAT).to_string()))
            }
            Self::Decimal(v) => ToSqlOutput::Owned(SqlValue::Text(v.to_string())),
            Self::Uuid(v) => ToSqlOutput::Owned(SqlValue::Text(v.hyphenated().to_string())),
            Self::Blob(v) => ToSqlOutput::Borrowed(ValueRef::Blob(v)),
        })
    }
}

fn read_value(value: ValueRef<'_>) -> DriverResult<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => Value::Text(
            std::str::from_utf8(bytes)
                .map_err(|_| DriverError::conversion("String", "non UTF-8 text"))?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

/// A connection to a SQLite database.
///
/// Query results are read into a [`BufferedCursor`] before the statement
/// handle is released, because a `rusqlite` statement cannot outlive the
/// borrow of its connection. A query therefore holds its entire result in
/// memory until the cursor is closed or dropped.
///
/// # Example
///
/// ```rust
/// use minorm_driver::{Connection, Cursor, SqliteConnection};
///
/// let mut conn = SqliteConnection::open_in_memory().unwrap();
/// conn.execute("CREATE TABLE t (x INTEGER)", &[]).unwrap();
/// let mut cursor = conn.query("SELECT COUNT(*) FROM t", &[]).unwrap();
/// let row = cursor.next_row().unwrap().unwrap();
/// assert_eq!(row.get_at(0), Some(&minorm_driver::Value::Integer(0)));
/// ```
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Opens the database file at `path` with default configuration.
    pub fn open(path: &Path) -> DriverResult<Self> {
        Self::open_with_config(path, &SqliteConfig::default())
    }

    /// Opens the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist and `create_if_missing`
    /// is false, or if SQLite cannot open it.
    pub fn open_with_config(path: &Path, config: &SqliteConfig) -> DriverResult<Self> {
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if config.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
        debug!(path = %path.display(), "opening sqlite database");
        let conn = rusqlite::Connection::open_with_flags(path, flags)?;
        Self::configure(conn, config)
    }

    /// Opens a fresh in-memory database.
    pub fn open_in_memory() -> DriverResult<Self> {
        Self::open_in_memory_with_config(&SqliteConfig::default())
    }

    /// Opens a fresh in-memory database with custom configuration.
    pub fn open_in_memory_with_config(config: &SqliteConfig) -> DriverResult<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::configure(conn, config)
    }

    fn configure(conn: rusqlite::Connection, config: &SqliteConfig) -> DriverResult<Self> {
        conn.busy_timeout(config.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        Ok(Self { conn })
    }

    /// Returns the underlying `rusqlite` connection.
    #[must_use]
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

impl Connection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> DriverResult<usize> {
        debug!(sql, params = params.len(), "execute");
        let mut stmt = self.conn.prepare(sql)?;
        Ok(stmt.execute(params_from_iter(params.iter()))?)
    }

    fn insert(&mut self, sql: &str, params: &[Value]) -> DriverResult<Option<i64>> {
        debug!(sql, params = params.len(), "insert");
        let mut stmt = self.conn.prepare(sql)?;
        let id = stmt.insert(params_from_iter(params.iter()))?;
        Ok(Some(id))
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> DriverResult<Box<dyn Cursor>> {
        debug!(sql, params = params.len(), "query");
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut buffered = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(read_value(row.get_ref(i)?)?);
            }
            buffered.push(values);
        }
        trace!(rows = buffered.len(), "query fetched");

        Ok(Box::new(BufferedCursor::new(columns, buffered)))
    }
}

/// Provides SQLite connections to a file or to fresh in-memory databases.
///
/// Every in-memory connection is a separate, empty database.
#[derive(Debug, Clone, Default)]
pub struct SqliteProvider {
    path: Option<PathBuf>,
    config: SqliteConfig,
}

impl SqliteProvider {
    /// Creates a provider for the database file at `path`.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: SqliteConfig::default(),
        }
    }

    /// Creates a provider of in-memory databases.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Replaces the connection configuration.
    #[must_use]
    pub fn with_config(mut self, config: SqliteConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the database path, `None` for in-memory databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl ConnectionProvider for SqliteProvider {
    fn get_connection(&self) -> DriverResult<Box<dyn Connection>> {
        let conn = match &self.path {
            Some(path) => SqliteConnection::open_with_config(path, &self.config)?,
            None => SqliteConnection::open_in_memory_with_config(&self.config)?,
        };
        Ok(Box::new(conn))
    }
}
