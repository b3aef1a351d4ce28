//! Transaction wrapper
//!
//! Each call runs exactly one unit of work in its own transaction. Write
//! transactions that are not committed are aborted when dropped, so every
//! early return through `?` leaves nothing open behind it.

use heed::{RoTxn, RwTxn};

use super::handle::{StorageHandle, Table};
use crate::error::{CacheError, Result};

impl StorageHandle {
    /// Run `op` in a read-only transaction
    ///
    /// The transaction is committed on every branch, including when `op`
    /// fails, to release the snapshot. An error from `op` takes precedence
    /// over a commit failure.
    pub fn read<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&RoTxn<'_>, Table) -> Result<T>,
    {
        let rtxn = self.env().read_txn().map_err(|e| {
            tracing::error!("Cannot begin read transaction: {}", e);
            CacheError::Transaction(e)
        })?;

        let outcome = op(&rtxn, self.table());
        let committed = rtxn.commit();

        let value = outcome?;
        committed.map_err(CacheError::Transaction)?;
        Ok(value)
    }

    /// Run `op` in a write transaction and commit it
    ///
    /// If `op` fails the transaction is aborted, never committed.
    pub fn write<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut RwTxn<'_>, Table) -> Result<T>,
    {
        let mut wtxn = self.env().write_txn().map_err(|e| {
            tracing::error!("Cannot begin write transaction: {}", e);
            CacheError::Transaction(e)
        })?;

        // Dropping `wtxn` on the error path aborts it
        let value = op(&mut wtxn, self.table())?;

        wtxn.commit().map_err(|e| {
            tracing::error!("Commit failed: {}", e);
            CacheError::Transaction(e)
        })?;
        Ok(value)
    }
}
