pub mod commands;
pub mod config;
pub mod events;
pub mod refresh;
pub mod state;

use std::sync::Arc;

use anyhow::Context;
use gigboard_store::Database;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ClientConfig;
use crate::events::EventSink;
use crate::refresh::{ChangeSubscription, Poller};
use crate::state::{AppState, SharedState};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gigboard_client=debug,gigboard_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// A running client: the shared state plus whatever keeps the UI in sync.
pub struct App {
    pub config: ClientConfig,
    pub state: SharedState,
    database: Database,
    change_forwarder: Option<ChangeSubscription>,
}

impl App {
    /// Open the configured store and seed any missing collections.
    pub fn open(config: ClientConfig) -> anyhow::Result<Self> {
        tracing::info!(backend = ?config.store.backend, "Starting {}", gigboard_shared::constants::APP_NAME);

        let database = Database::from_config(&config.store).context("Failed to open store")?;
        let seeded = database
            .initialize_if_absent()
            .context("Failed to seed store")?;
        if !seeded.is_noop() {
            tracing::info!(keys = seeded.created_keys.len(), "Fresh store initialised");
        }

        let state = AppState::new(database.clone()).shared();
        Ok(Self {
            config,
            state,
            database,
            change_forwarder: None,
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Forward every store change to `sink` as a `data-changed` event.
    pub fn attach_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.change_forwarder = Some(events::forward_changes(self.database.bus(), sink));
    }

    /// Stop forwarding changes. Returns `false` if no sink was attached.
    pub fn detach_sink(&mut self) -> bool {
        self.change_forwarder.take().is_some()
    }

    /// Start a timer reloading a view at the configured poll interval.
    /// Must be called from within a Tokio runtime.
    pub fn poll<F>(&self, reload: F) -> Poller
    where
        F: Fn() + Send + 'static,
    {
        Poller::spawn(self.config.poll_interval, reload)
    }
}
