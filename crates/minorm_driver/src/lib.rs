//! # minorm Driver
//!
//! Connection abstraction and the bundled SQLite driver for minorm.
//!
//! This crate is the lowest layer of minorm. It knows how to execute SQL
//! text with positional parameters and how to hand rows back; it knows
//! nothing about entities, tables or relations.
//!
//! ## Design Principles
//!
//! - A [`Connection`] executes statements and opens [`Cursor`]s
//! - Parameters and column values travel as [`Value`]s
//! - Each connection reports the SQL [`Dialect`] it speaks
//! - A [`ConnectionProvider`] hands out live connections
//!
//! ## Available Drivers
//!
//! - [`SqliteConnection`] - SQLite through `rusqlite`, file or in-memory
//!
//! ## Example
//!
//! ```rust
//! use minorm_driver::{Connection, SqliteConnection, Value};
//!
//! let mut conn = SqliteConnection::open_in_memory().unwrap();
//! conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", &[]).unwrap();
//! let id = conn.insert("INSERT INTO t(name) VALUES(?)", &[Value::from("a")]).unwrap();
//! assert_eq!(id, Some(1));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod connection;
mod error;
mod row;
mod sqlite;
mod value;

pub use config::SqliteConfig;
pub use connection::{Connection, ConnectionProvider, Dialect};
pub use error::{DriverError, DriverResult};
pub use row::{BufferedCursor, Cursor, Row};
pub use sqlite::{SqliteConnection, SqliteProvider};
pub use value::{FromValue, Value, DATETIME_FORMAT, DATE_FORMAT};
