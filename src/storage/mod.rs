//! Storage Module
//!
//! Owns the embedded LMDB environment and scopes every access to it in a
//! short-lived transaction.
//!
//! ## Responsibilities
//! - Open the environment with a fixed map size (optionally read-only)
//! - Resolve the single unnamed table once, in a bootstrap transaction
//! - Run each read or write in its own transaction
//! - Close the environment
//!
//! ## Transaction Scoping
//! Readers run against a snapshot and never wait on the writer; LMDB
//! serializes write transactions among themselves. No locking is added on
//! top of that.

mod handle;
mod txn;

pub use handle::{StorageHandle, Table};
