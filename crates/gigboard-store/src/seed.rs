//! Start-up seeding.
//!
//! [`Database::initialize_if_absent`] runs once when the app starts. Every
//! collection key that holds nothing yet is written as an empty array, and
//! the layout version is recorded. Keys that already hold data, even data
//! that no longer parses, are left alone, so calling it again is a no-op.

use gigboard_shared::constants::{KEY_SCHEMA_VERSION, SCHEMA_VERSION};
use gigboard_shared::Role;
use serde::Serialize;

use crate::collection::Collection;
use crate::database::Database;
use crate::error::Result;
use crate::models::Notification;

/// What a seeding pass wrote.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub created_keys: Vec<String>,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        self.created_keys.is_empty()
    }
}

/// Every key the store owns.
pub fn all_keys() -> Vec<String> {
    Collection::ALL
        .iter()
        .map(|c| c.key().to_string())
        .chain(Role::ALL.iter().map(Role::notifications_key))
        .collect()
}

impl Database {
    pub fn initialize_if_absent(&self) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        for key in all_keys() {
            if self.initialize_key_if_absent::<Notification>(&key, &[])? {
                report.created_keys.push(key);
            }
        }

        let stored_version = self
            .backend()
            .get(KEY_SCHEMA_VERSION)?
            .and_then(|raw| raw.trim().parse::<u32>().ok());

        tracing::info!(
            current_version = ?stored_version,
            target_version = SCHEMA_VERSION,
            "checking store layout"
        );

        if stored_version.is_none() {
            self.backend()
                .set(KEY_SCHEMA_VERSION, &SCHEMA_VERSION.to_string())?;
            report.created_keys.push(KEY_SCHEMA_VERSION.to_string());
        }

        if !report.is_noop() {
            tracing::info!(keys = ?report.created_keys, "seeded empty collections");
            self.notify_changed();
        }
        Ok(report)
    }

    /// Empty every collection. The layout version is kept.
    pub fn reset(&self) -> Result<()> {
        for key in all_keys() {
            self.write_collection_quiet::<Notification>(&key, &[])?;
        }
        tracing::info!("store reset");
        self.notify_changed();
        Ok(())
    }
}
