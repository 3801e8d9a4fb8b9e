//! Result rows and cursors.

use crate::error::{DriverError, DriverResult};
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// A single result row.
///
/// Column names are shared between all rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row from shared column names and its values.
    #[must_use]
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of values in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the position of `column`, compared case-insensitively.
    #[must_use]
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Returns the value of `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.index_of(column).and_then(|i| self.values.get(i))
    }

    /// Returns the value of `column` or a `ColumnNotFound` error.
    pub fn value(&self, column: &str) -> DriverResult<&Value> {
        self.get(column)
            .ok_or_else(|| DriverError::ColumnNotFound(column.to_string()))
    }

    /// Returns the value at position `index`.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Consumes the row, returning its values.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// A forward-only cursor over a query result.
///
/// A cursor holds a resource until it is exhausted or
/// [`close`](Cursor::close)d. Callers must not read after closing.
///
/// Rows are pulled one at a time, but a driver may fetch the whole result
/// from the engine before the first pull. The SQLite driver does: its
/// cursors are [`BufferedCursor`]s holding a snapshot of every row, so
/// memory grows with the size of the result and later writes on the same
/// connection are not seen by an open cursor.
pub trait Cursor: Send {
    /// Returns the result column names.
    fn columns(&self) -> &[String];

    /// Fetches the next row, or `None` once the result is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `CursorClosed` if the cursor was already released.
    fn next_row(&mut self) -> DriverResult<Option<Row>>;

    /// Releases the cursor. Closing twice is a no-op.
    fn close(&mut self);

    /// Returns true once the cursor has been released.
    fn is_closed(&self) -> bool;
}

/// A cursor over rows already fetched from the engine.
///
/// Drivers whose statement handles cannot outlive the borrow of their
/// connection buffer the raw rows here; decoding still happens lazily on
/// the consumer side.
#[derive(Debug)]
pub struct BufferedCursor {
    columns: Arc<[String]>,
    rows: VecDeque<Vec<Value>>,
    closed: bool,
}

impl BufferedCursor {
    /// Creates a cursor over `rows`.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.into(),
            rows: rows.into(),
            closed: false,
        }
    }

    /// Returns the number of rows not yet fetched.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Cursor for BufferedCursor {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> DriverResult<Option<Row>> {
        if self.closed {
            return Err(DriverError::CursorClosed);
        }
        Ok(self
            .rows
            .pop_front()
            .map(|values| Row::new(Arc::clone(&self.columns), values)))
    }

    fn close(&mut self) {
        self.closed = true;
        self.rows.clear();
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
