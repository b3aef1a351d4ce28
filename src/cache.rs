//! Cache Module
//!
//! The public face of geocache: open/close plus put and get of raw text
//! payloads and JSON records, keyed by geohash.
//!
//! ## Responsibilities
//! - Validate keys and payloads before touching storage
//! - Route each operation through exactly one transaction
//! - Translate storage outcomes into typed results, logging the failures
//!
//! ## Result Shapes
//! - Writes return `Result<()>`; [`CacheError::code`] gives the status code
//! - [`GeoCache::try_get_json`] keeps "absent", "corrupt" and "storage
//!   failure" apart
//! - [`GeoCache::get_json`] folds all three into `None`: a caller cannot tell
//!   a value that was never stored from one that no longer parses

use std::io::{self, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::storage::StorageHandle;

/// A disk-backed geohash cache
///
/// ## Concurrency Model
///
/// `GeoCache` is `Send + Sync`; share it across threads with `Arc`.
/// Readers see a consistent snapshot and proceed alongside the single
/// active writer. Closing consumes the cache, so it cannot happen while
/// another thread still holds a reference to it.
pub struct GeoCache {
    /// Cache configuration
    config: CacheConfig,

    /// Environment and table
    storage: StorageHandle,
}

impl GeoCache {
    /// Open the cache stored in the existing directory `path`
    pub fn open(path: impl AsRef<Path>, read_only: bool) -> Result<Self> {
        let config = CacheConfig::builder()
            .path(path.as_ref())
            .read_only(read_only)
            .build();
        Self::open_with(config)
    }

    /// Open with a full config
    pub fn open_with(config: CacheConfig) -> Result<Self> {
        let storage = StorageHandle::open(&config.path, config.read_only, config.map_size)?;
        Ok(Self { config, storage })
    }

    /// Close the cache and release its environment
    ///
    /// Consuming `self` makes a second close impossible.
    pub fn close(self) {
        self.storage.close();
    }

    /// Close a cache that may not exist; `None` is a no-op
    pub fn close_opt(cache: Option<Self>) {
        if let Some(cache) = cache {
            cache.close();
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store a text payload under `key`, replacing any previous value
    ///
    /// The payload is stored with a trailing zero byte. A failed write
    /// aborts its transaction rather than committing it.
    pub fn put(&self, key: &str, payload: &str) -> Result<()> {
        validate_key(key)?;
        let value = codec::encode_text(payload)?;
        self.put_value(key, &value)
    }

    /// Store `record` as minified JSON under `key`
    ///
    /// Serialization failures return before any transaction begins.
    pub fn put_json<T: Serialize + ?Sized>(&self, key: &str, record: &T) -> Result<()> {
        let text = codec::to_json_text(record).map_err(|e| {
            tracing::error!("Cannot serialize JSON for {}: {}", key, e);
            e
        })?;
        self.put(key, &text)
    }

    fn put_value(&self, key: &str, value: &[u8]) -> Result<()> {
        let outcome = self.storage.write(|wtxn, table| {
            table.put(wtxn, key, value).map_err(CacheError::Storage)
        });

        match &outcome {
            Ok(()) => tracing::trace!("Stored {} ({} bytes)", key, value.len()),
            Err(e) => tracing::error!("put {} failed ({}): {}", key, e.code(), e),
        }
        outcome
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Raw stored bytes for `key`, terminator included
    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        self.storage.read(|rtxn, table| {
            let value = table.get(rtxn, key).map_err(CacheError::Storage)?;
            Ok(value.map(<[u8]>::to_vec))
        })
    }

    /// Print the value for `key` to standard output
    ///
    /// Console convenience: the per-key outcome is only reported in the
    /// printed text. See [`GeoCache::get_to`].
    pub fn get(&self, key: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.get_to(key, &mut out)
    }

    /// Write the value for `key` to `out`
    ///
    /// Output lines:
    /// - found: the stored text
    /// - absent: ` [<key>] not found`
    /// - failure: `get: <message>`
    ///
    /// Only a failure of `out` itself is returned as an error.
    pub fn get_to<W: Write>(&self, key: &str, out: &mut W) -> io::Result<()> {
        match self.get_raw(key) {
            Ok(Some(value)) => {
                out.write_all(codec::terminated(&value))?;
                writeln!(out)
            }
            Ok(None) => writeln!(out, " [{}] not found", key),
            Err(e) => writeln!(out, "get: {}", e),
        }
    }

    /// Look up and decode the JSON record for `key`
    ///
    /// - `Ok(None)`: nothing stored under `key`
    /// - `Err(CacheError::Decode)`: stored value is not valid JSON text
    /// - `Err(CacheError::Storage | CacheError::Transaction)`: LMDB failure
    pub fn try_get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        validate_key(key)?;
        self.storage.read(|rtxn, table| {
            // Decode straight from the memory map while the snapshot is live
            match table.get(rtxn, key).map_err(CacheError::Storage)? {
                Some(value) => codec::decode_json(value).map(Some),
                None => Ok(None),
            }
        })
    }

    /// Look up the JSON record for `key`, degrading every failure to `None`
    ///
    /// A miss is silent. Storage and decode failures are logged at `warn`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get_json(key) {
            Ok(record) => record,
            Err(CacheError::Decode(msg)) => {
                tracing::warn!("Cannot decode JSON for {}: {}", key, msg);
                None
            }
            Err(e) => {
                tracing::warn!("get_json({}) failed: {}", key, e);
                None
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Directory holding the environment
    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    /// Whether the cache was opened read-only
    pub fn is_read_only(&self) -> bool {
        self.storage.is_read_only()
    }

    /// Get the configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The underlying environment and table
    pub fn storage(&self) -> &StorageHandle {
        &self.storage
    }
}

/// Keys are non-empty; they are stored as their UTF-8 bytes with no terminator
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key is empty".to_string()));
    }
    Ok(())
}
