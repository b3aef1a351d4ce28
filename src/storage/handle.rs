//! Storage handle lifecycle

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvFlags, EnvOpenOptions};

use crate::error::{CacheError, Result};

/// The single table: geohash keys to raw value bytes
pub type Table = Database<Str, Bytes>;

/// An open LMDB environment and its default table
///
/// Created once by [`StorageHandle::open`], released once by
/// [`StorageHandle::close`]. The table handle is resolved during open and
/// reused by every transaction afterwards.
pub struct StorageHandle {
    /// The LMDB environment
    env: Env,

    /// The unnamed database within `env`
    table: Table,

    read_only: bool,

    /// Released after `env` so the directory is free only once LMDB is done
    claim: DirClaim,
}

/// Directories with a live handle in this process
static OPEN_DIRS: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();

fn open_dirs() -> MutexGuard<'static, HashSet<PathBuf>> {
    OPEN_DIRS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive claim on an environment directory for one handle
///
/// heed shares one `Env` per directory, and `close` waits for its last
/// reference, so at most one handle per directory may be live.
struct DirClaim {
    path: PathBuf,
}

impl DirClaim {
    fn acquire(path: &Path) -> Result<Self> {
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if !open_dirs().insert(path.clone()) {
            return Err(CacheError::AlreadyOpen(path));
        }
        Ok(Self { path })
    }
}

impl Drop for DirClaim {
    fn drop(&mut self) {
        open_dirs().remove(&self.path);
    }
}

impl StorageHandle {
    /// Open the environment rooted at `path`
    ///
    /// Steps:
    /// 1. Check that `path` is an existing directory (never created here)
    ///    with no other live handle in this process
    /// 2. Open the environment with the map size and access mode
    /// 3. Resolve the default table in a bootstrap transaction and commit it
    ///
    /// On any failure the environment is dropped before the error returns.
    pub fn open(path: &Path, read_only: bool, map_size: usize) -> Result<Self> {
        // Step 1: The directory must already exist
        if !path.is_dir() {
            tracing::error!("{} is not a directory", path.display());
            return Err(CacheError::NotADirectory(path.to_path_buf()));
        }
        let claim = DirClaim::acquire(path).map_err(|e| {
            tracing::error!("Cannot open {}: {}", path.display(), e);
            e
        })?;

        // Step 2: Open the environment
        let mut options = EnvOpenOptions::new();
        options.map_size(map_size);
        if read_only {
            // SAFETY: READ_ONLY only restricts what the environment may do
            unsafe {
                options.flags(EnvFlags::READ_ONLY);
            }
        }

        // SAFETY: the environment is opened at most once per handle and its
        // files are only modified through LMDB
        let env = unsafe { options.open(path) }.map_err(|e| {
            tracing::error!("Cannot open environment at {}: {}", path.display(), e);
            CacheError::Environment(e)
        })?;

        // Step 3: Bootstrap transaction for the table handle
        let table = Self::bootstrap(&env, read_only).map_err(|e| {
            tracing::error!("Cannot open default table at {}: {}", path.display(), e);
            e
        })?;

        tracing::debug!(
            "Opened cache environment at {} (read_only={}, map_size={})",
            path.display(),
            read_only,
            map_size
        );

        Ok(Self {
            env,
            table,
            read_only,
            claim,
        })
    }

    /// Resolve the unnamed table and commit so the handle stays valid for
    /// later transactions.
    fn bootstrap(env: &Env, read_only: bool) -> Result<Table> {
        if read_only {
            let rtxn = env.read_txn().map_err(CacheError::Transaction)?;
            let table = env
                .open_database::<Str, Bytes>(&rtxn, None)
                .map_err(CacheError::Transaction)?
                .ok_or(CacheError::Transaction(heed::Error::Mdb(
                    heed::MdbError::NotFound,
                )))?;
            rtxn.commit().map_err(CacheError::Transaction)?;
            Ok(table)
        } else {
            let mut wtxn = env.write_txn().map_err(CacheError::Transaction)?;
            let table = env
                .create_database::<Str, Bytes>(&mut wtxn, None)
                .map_err(CacheError::Transaction)?;
            wtxn.commit().map_err(|e| {
                tracing::error!("Commit after open failed: {}", e);
                CacheError::Transaction(e)
            })?;
            Ok(table)
        }
    }

    /// Close the environment
    ///
    /// No transaction is committed or aborted here; callers must not close
    /// while operations are in flight. Blocks until LMDB has released the
    /// environment, so the same directory can be reopened right after.
    /// This handle holds the only reference to the environment, so the wait
    /// is bounded. Dropping the handle without `close` releases it the same way.
    pub fn close(self) {
        let Self { env, claim, .. } = self;
        let path = env.path().to_path_buf();
        env.prepare_for_closing().wait();
        drop(claim);
        tracing::debug!("Closed cache environment at {}", path.display());
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }

    pub(crate) fn table(&self) -> Table {
        self.table
    }

    /// Whether the environment was opened read-only
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Directory holding the environment
    pub fn path(&self) -> &Path {
        self.env.path()
    }
}
