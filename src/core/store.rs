//! Catalog store: the single point of mutation for the catalog document.
//!
//! Reads load the document from disk. Writes are replaced atomically
//! (temp file in the same directory, then rename), so any read sees a
//! complete document.
//!
//! Mutations run inside a [`CatalogTxn`], which holds two locks for its
//! whole read-mutate-persist sequence:
//! - an in-process async mutex, serializing tasks of this process
//! - an exclusive advisory lock on `<catalog>.lock`, serializing processes
//!
//! Nothing is cached between operations, so a failed persist can never
//! leave in-memory state ahead of the document on disk.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error};

use crate::domain::Catalog;

use super::error::CatalogError;

/// Default upper bound on waiting for another writer
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// File-backed catalog document
#[derive(Debug)]
pub struct CatalogStore {
    /// Path to the JSON document
    path: PathBuf,

    /// Path to the advisory lock file
    lock_path: PathBuf,

    /// Serializes writers within this process
    writer: Mutex<()>,

    lock_timeout: Duration,
}

impl CatalogStore {
    /// Open a store for the document at `path` (the file need not exist yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "catalog".into());
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);

        Self {
            path,
            lock_path,
            writer: Mutex::new(()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Path to the catalog document
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Read a consistent snapshot of the catalog
    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        read_catalog(&self.path).await
    }

    /// Start a write transaction on the current document
    pub async fn begin(&self) -> Result<CatalogTxn<'_>, CatalogError> {
        let guard = self.writer.lock().await;
        let lock_file = self.acquire_file_lock().await?;
        let catalog = read_catalog(&self.path).await?;

        Ok(CatalogTxn {
            store: self,
            catalog,
            _lock_file: lock_file,
            _guard: guard,
        })
    }

    /// Apply `f` to the current document and persist the result.
    ///
    /// If `f` fails, nothing is written.
    pub async fn mutate<F, T>(&self, f: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut Catalog) -> Result<T, CatalogError>,
    {
        let mut txn = self.begin().await?;
        let value = f(txn.catalog_mut())?;
        txn.commit().await?;
        Ok(value)
    }

    async fn acquire_file_lock(&self) -> Result<std::fs::File, CatalogError> {
        if let Some(parent) = self.lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| CatalogError::io(parent, e))?;
            }
        }

        let file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .await
            .map_err(|e| CatalogError::io(&self.lock_path, e))?
            .into_std()
            .await;

        let contended = fs2::lock_contended_error().raw_os_error();
        let started = Instant::now();

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(file),
                Err(e) if e.raw_os_error() == contended => {
                    let waited = started.elapsed();
                    if waited >= self.lock_timeout {
                        error!(path = %self.lock_path.display(), ?waited, "Catalog lock timeout");
                        return Err(CatalogError::LockTimeout {
                            path: self.lock_path.clone(),
                            waited,
                        });
                    }
                    debug!(path = %self.lock_path.display(), "Catalog locked by another process, waiting");
                    tokio::time::sleep(LOCK_POLL_INTERVAL).await;
                }
                Err(e) => return Err(CatalogError::io(&self.lock_path, e)),
            }
        }
    }
}

/// An open write transaction.
///
/// Holds the writer locks until dropped. Changes reach disk only through
/// [`CatalogTxn::commit`]; dropping without committing discards them.
pub struct CatalogTxn<'a> {
    store: &'a CatalogStore,
    catalog: Catalog,
    // Released in declaration order: file lock first, then the in-process mutex
    _lock_file: std::fs::File,
    _guard: MutexGuard<'a, ()>,
}

impl CatalogTxn<'_> {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Persist the document atomically. The locks stay held until drop.
    pub async fn commit(&mut self) -> Result<(), CatalogError> {
        if let Err(e) = write_catalog(&self.store.path, &self.catalog).await {
            error!(path = %self.store.path.display(), error = %e, "Failed to persist catalog");
            return Err(e);
        }
        Ok(())
    }
}

/// Read the document; a missing or blank file is an empty catalog
async fn read_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Catalog::new()),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read catalog");
            return Err(CatalogError::io(path, e));
        }
    };

    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Catalog::new());
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to parse catalog");
        CatalogError::from(e)
    })
}

async fn write_catalog(path: &Path, catalog: &Catalog) -> Result<(), CatalogError> {
    let payload = serde_json::to_vec_pretty(catalog)?;
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || persist_atomically(&path, &payload)).await?
}

fn persist_atomically(path: &Path, payload: &[u8]) -> Result<(), CatalogError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&dir).map_err(|e| CatalogError::io(&dir, e))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| CatalogError::io(&dir, e))?;
    tmp.write_all(payload)
        .map_err(|e| CatalogError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CatalogError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| CatalogError::io(path, e.error))?;

    debug!(path = %path.display(), bytes = payload.len(), "Catalog persisted");
    Ok(())
}
