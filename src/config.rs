//! Configuration for geocache
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Default upper bound for the memory map (1 GiB).
///
/// Set once when the environment is created and never grown afterwards.
pub const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;

/// Configuration for a cache instance
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Existing directory holding the environment's data and lock files.
    /// It is never created by the cache.
    pub path: PathBuf,

    /// Open the environment read-only
    pub read_only: bool,

    /// Maximum size of the memory map in bytes
    pub map_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./geocache_data"),
            read_only: false,
            map_size: DEFAULT_MAP_SIZE,
        }
    }
}

impl CacheConfig {
    /// Create a new config builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }
}

/// Builder for CacheConfig
#[derive(Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Set the environment directory
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Request read-only mode
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    /// Set the map size (in bytes)
    pub fn map_size(mut self, bytes: usize) -> Self {
        self.config.map_size = bytes;
        self
    }

    pub fn build(self) -> CacheConfig {
        self.config
    }
}
