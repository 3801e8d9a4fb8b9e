//! Manager configuration.

/// Configuration for a [`Manager`](crate::Manager).
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether loaded and saved records are kept in the identity cache.
    pub cache_enabled: bool,

    /// Whether deleting a parent deletes the children it owns.
    pub cascade_delete: bool,

    /// Whether a cascading delete also removes child rows that were never
    /// loaded into the parent's collection.
    pub sweep_orphans: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cascade_delete: true,
            sweep_orphans: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the identity cache is used.
    #[must_use]
    pub const fn cache_enabled(mut self, value: bool) -> Self {
        self.cache_enabled = value;
        self
    }

    /// Sets whether deletes cascade to owned children.
    #[must_use]
    pub const fn cascade_delete(mut self, value: bool) -> Self {
        self.cascade_delete = value;
        self
    }

    /// Sets whether cascades sweep unloaded child rows.
    #[must_use]
    pub const fn sweep_orphans(mut self, value: bool) -> Self {
        self.sweep_orphans = value;
        self
    }
}
