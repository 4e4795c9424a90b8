//! Store handle.
//!
//! The [`Database`] struct owns a shared [`KeyValueBackend`] and the
//! [`ChangeBus`] mutations are announced on. Handles are cheap to clone;
//! clones share both the backend and the bus.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use gigboard_shared::constants::DEFAULT_PLATFORM_FEE_RATE;

use crate::backend::{FileBackend, KeyValueBackend, MemoryBackend};
use crate::bus::{ChangeBus, DataChanged, SubscriptionId};
use crate::config::{BackendKind, StoreConfig};
use crate::error::{Result, StoreError};

#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn KeyValueBackend>,
    bus: ChangeBus,
    fee_rate: f64,
}

impl Database {
    /// Wrap a backend with a fresh change bus.
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self::with_bus(backend, ChangeBus::new())
    }

    /// Wrap a backend, announcing changes on an existing bus. Handles built
    /// over the same backend and bus behave like views of one store.
    pub fn with_bus(backend: Arc<dyn KeyValueBackend>, bus: ChangeBus) -> Self {
        Self {
            backend,
            bus,
            fee_rate: DEFAULT_PLATFORM_FEE_RATE,
        }
    }

    /// Empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Open (or create) a file-backed store in the platform data directory:
    /// - Linux:   `~/.local/share/gigboard/store/`
    /// - macOS:   `~/Library/Application Support/com.gigboard.gigboard/store/`
    /// - Windows: `{FOLDERID_RoamingAppData}\gigboard\gigboard\data\store\`
    pub fn open_default() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "gigboard", "gigboard").ok_or(StoreError::NoDataDir)?;
        let dir = project_dirs.data_dir().join("store");

        tracing::info!(path = %dir.display(), "opening store");

        Self::open_at(&dir)
    }

    /// Open (or create) a file-backed store at an explicit directory.
    /// Handles opened on the same directory share one change bus.
    pub fn open_at(dir: &Path) -> Result<Self> {
        let backend = FileBackend::open(dir)?;
        let bus = ChangeBus::shared_for(backend.dir());
        Ok(Self::with_bus(Arc::new(backend), bus))
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let db = match (&config.backend, &config.data_dir) {
            (BackendKind::Memory, _) => Self::in_memory(),
            (BackendKind::File, Some(dir)) => Self::open_at(dir)?,
            (BackendKind::File, None) => Self::open_default()?,
        };
        Ok(db.with_fee_rate(config.platform_fee_rate))
    }

    /// Share of a completed gig's pay kept as the platform fee.
    pub fn with_fee_rate(mut self, rate: f64) -> Self {
        self.fee_rate = rate;
        self
    }

    pub fn fee_rate(&self) -> f64 {
        self.fee_rate
    }

    pub fn backend(&self) -> &dyn KeyValueBackend {
        self.backend.as_ref()
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// Register a callback fired after every mutation.
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(DataChanged) + Send + Sync + 'static,
    {
        self.bus.on_change(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub(crate) fn notify_changed(&self) -> DataChanged {
        self.bus.notify()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("bus", &self.bus)
            .field("fee_rate", &self.fee_rate)
            .finish_non_exhaustive()
    }
}
