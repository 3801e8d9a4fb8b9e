//! Test managers with automatic cleanup.

use crate::model::{Author, Book, Publisher};
use crate::recording::{RecordingConnection, StatementLog};
use minorm_core::{Config, EntityClass, Manager};
use minorm_driver::{ConnectionProvider, SqliteConnection, SqliteProvider};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The classes of the library model, parents first.
pub fn library_classes() -> [EntityClass; 3] {
    [
        EntityClass::of::<Publisher>(),
        EntityClass::of::<Book>(),
        EntityClass::of::<Author>(),
    ]
}

/// A manager over a throwaway SQLite database.
pub struct TestManager {
    /// The manager instance.
    pub manager: Manager,
    /// Every statement the manager ran.
    pub log: StatementLog,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
    path: Option<PathBuf>,
}

impl TestManager {
    /// Creates a manager over an in-memory database.
    pub fn memory() -> Self {
        Self::memory_with_config(Config::default())
    }

    /// Creates a manager over an in-memory database with `config`.
    pub fn memory_with_config(config: Config) -> Self {
        let conn = SqliteConnection::open_in_memory().expect("Failed to open in-memory database");
        let (conn, log) = RecordingConnection::wrap(Box::new(conn));
        Self {
            manager: Manager::with_config(Box::new(conn), config),
            log,
            _temp_dir: None,
            path: None,
        }
    }

    /// Creates a manager over a database file in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("test.db");
        let conn = SqliteProvider::file(&path)
            .get_connection()
            .expect("Failed to open file database");
        let (conn, log) = RecordingConnection::wrap(conn);
        Self {
            manager: Manager::new(Box::new(conn)),
            log,
            _temp_dir: Some(temp_dir),
            path: Some(path),
        }
    }

    /// Creates an in-memory manager with the library model registered and
    /// its foreign keys in place.
    pub fn library() -> Self {
        let mut test = Self::memory();
        let classes = library_classes();
        test.manager
            .register(&classes)
            .expect("Failed to register library model");
        test.manager
            .create_relationships(&classes)
            .expect("Failed to create library relationships");
        test
    }

    /// Returns the database file, if file-based.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Opens a second manager on the same database file.
    pub fn reopen(&self) -> Manager {
        let path = self.path().expect("Only file databases can be reopened");
        Manager::connect(&SqliteProvider::file(path)).expect("Failed to reopen database")
    }
}

impl std::ops::Deref for TestManager {
    type Target = Manager;

    fn deref(&self) -> &Self::Target {
        &self.manager
    }
}

impl std::ops::DerefMut for TestManager {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.manager
    }
}

/// Runs a test against the registered library model.
///
/// # Example
///
/// ```rust,ignore
/// use minorm_testkit::with_library;
///
/// #[test]
/// fn my_test() {
///     with_library(|manager| {
///         manager.save(&Record::new(Book::new("Dune", None))).unwrap();
///     });
/// }
/// ```
pub fn with_library<F, R>(f: F) -> R
where
    F: FnOnce(&mut Manager) -> R,
{
    let mut test = TestManager::library();
    f(&mut test.manager)
}
