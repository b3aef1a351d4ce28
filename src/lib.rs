//! # geocache
//!
//! A transactional, disk-backed cache of JSON geolocation records keyed by
//! geohash, stored in an LMDB environment:
//! - One environment and one unnamed table per cache
//! - One short-lived transaction per operation
//! - Values stored as text with a trailing zero byte
//! - Multiple concurrent readers alongside a single writer
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        GeoCache                             │
//! │        open / close / put / put_json / get / get_json       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Codec    │          │ Transaction │
//!   │ (JSON + \0) │          │ (read/write)│
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │StorageHandle│
//!                           │ (LMDB env)  │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use geocache::GeoCache;
//! use serde_json::{json, Value};
//!
//! let cache = GeoCache::open("/var/spool/geocache", false)?;
//! cache.put_json("u33dc0", &json!({ "cc": "DE", "locality": "Berlin" }))?;
//!
//! let record: Option<Value> = cache.get_json("u33dc0");
//! assert!(record.is_some());
//!
//! cache.close();
//! # Ok::<(), geocache::CacheError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod storage;
pub mod cache;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CacheError, Result};
pub use config::{CacheConfig, DEFAULT_MAP_SIZE};
pub use cache::GeoCache;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of geocache
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
