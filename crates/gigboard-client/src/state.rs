//! Application state shared across all commands.
//!
//! The [`AppState`] struct is wrapped in `Arc<Mutex<>>` so that every command
//! handler, timer and change listener can reach the same store handle and
//! session.

use std::sync::{Arc, Mutex};

use gigboard_shared::Role;
use gigboard_store::Database;
use serde::{Deserialize, Serialize};

pub type SharedState = Arc<Mutex<AppState>>;

/// The signed-in user, as far as the marketplace is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

pub struct AppState {
    /// Handle to the local store. Cloning it shares backend and change bus.
    pub database: Database,

    /// `None` until someone signs in.
    pub current_user: Option<Session>,
}

impl AppState {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            current_user: None,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn session(&self) -> Result<&Session, String> {
        self.current_user
            .as_ref()
            .ok_or_else(|| "Not signed in".to_string())
    }
}
