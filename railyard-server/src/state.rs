//! Shared access to the snapshot store.

use std::sync::{Arc, Mutex};

use actix_web::web;
use railyard_store_db::{SeedOutcome, SnapshotStore};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Handle to the single store instance, shared by all workers.
///
/// Every call holds the lock for the whole read-modify-persist cycle, so
/// writes are serialized and each one is on disk before the next starts.
#[derive(Clone)]
pub(crate) struct StoreHandle {
    inner: Arc<Mutex<SnapshotStore>>,
}

impl StoreHandle {
    pub(crate) fn new(store: SnapshotStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` against the store on the blocking thread pool.
    pub(crate) async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&SnapshotStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        web::block(move || {
            let store = inner.lock().map_err(|_| AppError::Internal {
                reason: "store lock poisoned".to_string(),
            })?;
            f(&store)
        })
        .await
        .map_err(|e| AppError::Internal {
            reason: e.to_string(),
        })?
    }
}

/// Open the configured snapshot and seed it if it has no routes yet.
pub(crate) fn open_store(config: &Config) -> Result<SnapshotStore> {
    let store = SnapshotStore::open(&config.database_path)?;
    log::info!("using database {}", config.database_path.display());

    if let Some(seed_dir) = &config.seed_dir {
        match store.seed_from_dir(seed_dir)? {
            SeedOutcome::Seeded {
                trains,
                routes,
                links,
            } => log::info!(
                "seeded {trains} trains, {routes} routes and {links} links from {}",
                seed_dir.display()
            ),
            SeedOutcome::AlreadyPopulated => log::debug!("store already populated"),
            SeedOutcome::MissingFiles => {
                log::info!("no seed data in {}", seed_dir.display())
            }
        }
    }
    Ok(store)
}
