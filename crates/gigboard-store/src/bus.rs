//! Change-notification bus.
//!
//! The bus carries a single payload-free signal: "something in the store
//! changed, re-read what you need". It is delivered two ways from the same
//! [`ChangeBus::notify`] call:
//!
//! - synchronously to callbacks registered with [`ChangeBus::on_change`] in
//!   the calling context, and
//! - through a [`tokio::sync::broadcast`] channel to every receiver obtained
//!   from [`ChangeBus::watch`], for consumers living in other tasks, threads
//!   or store handles that share the bus.
//!
//! Store handles opened separately on the same data directory get the same
//! bus from [`ChangeBus::shared_for`], so a write through one handle reaches
//! listeners of every other handle in the process. Handles in other
//! processes are not signalled and rely on polling.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use gigboard_shared::constants::CHANGE_CHANNEL_CAPACITY;
use tokio::sync::broadcast;

/// Handle returned by [`ChangeBus::on_change`], used to unsubscribe.
pub type SubscriptionId = u64;

/// The change signal. `generation` increases by one per notification so a
/// consumer can tell whether it has missed any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataChanged {
    pub generation: u64,
}

type Listener = Arc<dyn Fn(DataChanged) + Send + Sync>;

struct BusInner {
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
    generation: AtomicU64,
    tx: broadcast::Sender<DataChanged>,
}

/// Buses of the file-backed stores open in this process, by directory.
static SHARED_BUSES: OnceLock<Mutex<HashMap<PathBuf, Weak<BusInner>>>> = OnceLock::new();

/// Cloneable handle to a shared bus.
#[derive(Clone)]
pub struct ChangeBus {
    inner: Arc<BusInner>,
}

impl ChangeBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(BusInner {
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                generation: AtomicU64::new(0),
                tx,
            }),
        }
    }

    /// The bus of the store at `location`. Every call with the same
    /// directory returns a handle to the same bus for as long as one handle
    /// is alive.
    pub fn shared_for(location: &Path) -> Self {
        let key = location
            .canonicalize()
            .unwrap_or_else(|_| location.to_path_buf());

        let mut buses = SHARED_BUSES
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        buses.retain(|_, bus| bus.strong_count() > 0);

        if let Some(inner) = buses.get(&key).and_then(Weak::upgrade) {
            tracing::debug!(path = %key.display(), "joining shared change bus");
            return Self { inner };
        }

        let bus = Self::new();
        buses.insert(key, Arc::downgrade(&bus.inner));
        bus
    }

    /// Register a callback run after every mutation.
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(DataChanged) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners().push((id, Arc::new(callback)));
        tracing::trace!(subscription = id, "change listener registered");
        id
    }

    /// Remove a callback. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        before != listeners.len()
    }

    /// Receiver for consumers outside the calling context.
    pub fn watch(&self) -> broadcast::Receiver<DataChanged> {
        self.inner.tx.subscribe()
    }

    /// Broadcast the change signal.
    pub fn notify(&self) -> DataChanged {
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let event = DataChanged { generation };

        // Snapshot so callbacks can (un)subscribe while being delivered.
        let snapshot: Vec<Listener> = self
            .listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }

        // No receivers is not an error.
        let _ = self.inner.tx.send(event);

        tracing::trace!(generation, "data changed");
        event
    }

    /// Number of notifications sent so far.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("generation", &self.generation())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
