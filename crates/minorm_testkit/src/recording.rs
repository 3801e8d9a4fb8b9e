//! A connection wrapper that records executed SQL.

use minorm_driver::{Connection, Cursor, Dialect, DriverResult, Value};
use parking_lot::Mutex;
use std::sync::Arc;

/// The shared log of a [`RecordingConnection`].
#[derive(Debug, Clone, Default)]
pub struct StatementLog(Arc<Mutex<Vec<String>>>);

impl StatementLog {
    /// Returns a copy of every recorded statement, oldest first.
    pub fn statements(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Counts recorded statements starting with `prefix`.
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .iter()
            .filter(|sql| sql.starts_with(prefix))
            .count()
    }

    /// Counts recorded statements equal to `sql`.
    pub fn count_exact(&self, sql: &str) -> usize {
        self.0.lock().iter().filter(|s| *s == sql).count()
    }

    /// Forgets every recorded statement.
    pub fn clear(&self) {
        self.0.lock().clear();
    }

    fn push(&self, sql: &str) {
        self.0.lock().push(sql.to_string());
    }
}

/// Wraps a connection and records the SQL of every call.
pub struct RecordingConnection {
    inner: Box<dyn Connection>,
    log: StatementLog,
}

impl RecordingConnection {
    /// Wraps `inner`, returning the wrapper and a handle to its log.
    pub fn wrap(inner: Box<dyn Connection>) -> (Self, StatementLog) {
        let log = StatementLog::default();
        (
            Self {
                inner,
                log: log.clone(),
            },
            log,
        )
    }
}

impl Connection for RecordingConnection {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> DriverResult<usize> {
        self.log.push(sql);
        self.inner.execute(sql, params)
    }

    fn insert(&mut self, sql: &str, params: &[Value]) -> DriverResult<Option<i64>> {
        self.log.push(sql);
        self.inner.insert(sql, params)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> DriverResult<Box<dyn Cursor>> {
        self.log.push(sql);
        self.inner.query(sql, params)
    }
}
