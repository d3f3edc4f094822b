//! Lazily opened, read-only quote source backed by a bootstrapped store file

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::storage::database::QuoteStore;
use crate::storage::models::Quote;
use crate::{ProseClockError, Result};

/// What `DataSource::bootstrap` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The seed was copied into place
    Copied { bytes: u64 },
    /// A store already existed, nothing was touched
    AlreadyPresent,
}

/// Shared read handle to an opened store.
///
/// Clones refer to the same underlying connection.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<Mutex<QuoteStore>>,
}

impl StoreHandle {
    fn new(store: QuoteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Whether two handles are backed by the same connection
    pub fn same_store(&self, other: &StoreHandle) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, QuoteStore>> {
        self.store
            .lock()
            .map_err(|_| ProseClockError::Lookup("store lock poisoned".to_string()))
    }

    /// Random quote for `minute`, storage errors included
    pub fn try_lookup(&self, minute: i32) -> Result<Option<Quote>> {
        self.lock()?.random_for_minute(minute)
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("store", &Arc::as_ptr(&self.store))
            .finish()
    }
}

/// Owner of the store file and its one cached handle
pub struct DataSource {
    seed_path: PathBuf,
    db_path: PathBuf,
    handle: Mutex<Option<StoreHandle>>,
    bootstrapping: Mutex<()>,
}

impl DataSource {
    pub fn new(seed_path: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            seed_path: seed_path.into(),
            db_path: db_path.into(),
            handle: Mutex::new(None),
            bootstrapping: Mutex::new(()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.store.seed_path.clone(), settings.database_path())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn seed_path(&self) -> &Path {
        &self.seed_path
    }

    /// Copy the seed into place unless a store already exists.
    ///
    /// The copy lands in a sibling temporary file first, so an interrupted
    /// copy never leaves a partial store behind.
    ///
    /// Concurrent calls are serialized; only one of them copies.
    pub fn bootstrap(&self) -> Result<BootstrapOutcome> {
        let _guard = self.bootstrapping.lock().unwrap_or_else(|e| e.into_inner());

        debug!(
            "Bootstrap check: {} exists: {}",
            self.db_path.display(),
            self.db_path.exists()
        );

        if self.db_path.exists() {
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ProseClockError::Bootstrap(format!("{}: {}", parent.display(), e))
            })?;
        }

        let partial = self.db_path.with_extension("db.partial");
        let bytes = std::fs::copy(&self.seed_path, &partial).map_err(|e| {
            let _ = std::fs::remove_file(&partial);
            ProseClockError::Bootstrap(format!(
                "copying {} to {}: {}",
                self.seed_path.display(),
                partial.display(),
                e
            ))
        })?;

        std::fs::rename(&partial, &self.db_path).map_err(|e| {
            let _ = std::fs::remove_file(&partial);
            ProseClockError::Bootstrap(format!("{}: {}", self.db_path.display(), e))
        })?;

        info!("Quote store created at {} ({} bytes)", self.db_path.display(), bytes);
        Ok(BootstrapOutcome::Copied { bytes })
    }

    fn cached(&self) -> MutexGuard<'_, Option<StoreHandle>> {
        self.handle.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the cached handle, opening the store on first use.
    ///
    /// Blocks on file I/O; call it off the event loop.
    pub fn open(&self) -> Result<StoreHandle> {
        let mut cached = self.cached();

        if let Some(handle) = cached.as_ref() {
            return Ok(handle.clone());
        }

        let store = QuoteStore::open_read_only(&self.db_path)?;
        let handle = StoreHandle::new(store);
        *cached = Some(handle.clone());

        info!("Quote store opened: {}", self.db_path.display());
        Ok(handle)
    }

    /// Random quote for `minute`.
    ///
    /// Storage failures are logged and reported as a miss.
    pub fn lookup(&self, handle: &StoreHandle, minute: i32) -> Option<Quote> {
        match handle.try_lookup(minute) {
            Ok(quote) => {
                if let Some(q) = &quote {
                    debug!("Got quote {} for minute {}", q.id, minute);
                }
                quote
            }
            Err(e) => {
                warn!("Lookup for minute {} failed: {}", minute, e);
                None
            }
        }
    }

    /// Drop the cached handle; the next `open` reopens the file
    pub fn close(&self) {
        if self.cached().take().is_some() {
            info!("Quote store closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.cached().is_some()
    }

    /// Whether `handle` is the one currently cached
    pub fn holds(&self, handle: &StoreHandle) -> bool {
        self.cached()
            .as_ref()
            .is_some_and(|cached| cached.same_store(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::NewQuote;
    use tempfile::tempdir;

    fn write_seed(path: &Path, minutes: &[i32]) {
        let store = QuoteStore::create(path).unwrap();
        let quotes: Vec<NewQuote> = minutes
            .iter()
            .map(|&minute| NewQuote {
                minute,
                text: format!("quote at {}", minute),
                author: "Author".to_string(),
                book: "Book".to_string(),
            })
            .collect();
        store.insert_quotes(&quotes).unwrap();
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let tmp = tempdir().unwrap();
        let seed = tmp.path().join("seed.db");
        write_seed(&seed, &[100]);
        let source = DataSource::new(&seed, tmp.path().join("data").join("quotes.db"));

        let first = source.bootstrap().unwrap();
        assert!(matches!(first, BootstrapOutcome::Copied { .. }));
        let after_first = std::fs::read(source.db_path()).unwrap();

        assert_eq!(source.bootstrap().unwrap(), BootstrapOutcome::AlreadyPresent);
        let after_second = std::fs::read(source.db_path()).unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(after_first, std::fs::read(&seed).unwrap());
    }

    #[test]
    fn bootstrap_without_seed_fails_and_leaves_no_store() {
        let tmp = tempdir().unwrap();
        let source = DataSource::new(tmp.path().join("missing.db"), tmp.path().join("quotes.db"));

        let err = source.bootstrap().unwrap_err();
        assert!(matches!(err, ProseClockError::Bootstrap(_)));
        assert!(!source.db_path().exists());
        assert!(!tmp.path().join("quotes.db.partial").exists());
    }

    #[test]
    fn open_caches_a_single_handle() {
        let tmp = tempdir().unwrap();
        let seed = tmp.path().join("seed.db");
        write_seed(&seed, &[100]);
        let source = DataSource::new(&seed, tmp.path().join("quotes.db"));
        source.bootstrap().unwrap();

        let first = source.open().unwrap();
        let second = source.open().unwrap();
        assert!(first.same_store(&second));

        source.close();
        assert!(!source.is_open());
        let reopened = source.open().unwrap();
        assert!(!reopened.same_store(&first));
        assert!(source.holds(&reopened));
        assert!(!source.holds(&first));
    }

    #[test]
    fn concurrent_bootstraps_copy_once() {
        let tmp = tempdir().unwrap();
        let seed = tmp.path().join("seed.db");
        write_seed(&seed, &[100, 200]);
        let source = Arc::new(DataSource::new(&seed, tmp.path().join("data").join("quotes.db")));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let source = Arc::clone(&source);
                std::thread::spawn(move || source.bootstrap().unwrap())
            })
            .collect();
        let outcomes: Vec<BootstrapOutcome> =
            workers.into_iter().map(|w| w.join().unwrap()).collect();

        let copies = outcomes
            .iter()
            .filter(|o| matches!(o, BootstrapOutcome::Copied { .. }))
            .count();
        assert_eq!(copies, 1);
        assert_eq!(std::fs::read(source.db_path()).unwrap(), std::fs::read(&seed).unwrap());
    }

    #[test]
    fn lookup_is_exact() {
        let tmp = tempdir().unwrap();
        let seed = tmp.path().join("seed.db");
        write_seed(&seed, &[100, 100, 200]);
        let source = DataSource::new(&seed, tmp.path().join("quotes.db"));
        source.bootstrap().unwrap();
        let handle = source.open().unwrap();

        assert_eq!(source.lookup(&handle, 100).unwrap().minute, 100);
        assert_eq!(source.lookup(&handle, 200).unwrap().minute, 200);
        assert!(source.lookup(&handle, 150).is_none());
        assert!(source.lookup(&handle, 5000).is_none());
    }
}
