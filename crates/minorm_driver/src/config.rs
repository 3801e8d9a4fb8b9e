//! SQLite driver configuration.

use std::time::Duration;

/// Configuration for opening a SQLite connection.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Whether to create the database file if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether SQLite enforces foreign-key constraints.
    pub foreign_keys: bool,

    /// How long to wait on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            foreign_keys: true,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl SqliteConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the database file if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether foreign-key constraints are enforced.
    #[must_use]
    pub const fn foreign_keys(mut self, value: bool) -> Self {
        self.foreign_keys = value;
        self
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}
