//! Command handlers invoked by the UI.
//!
//! Each sub-module groups related commands by domain. Every command takes the
//! [`SharedState`] plus plain arguments and answers with a
//! [`CommandResult`], so a failure reaches the UI as a message instead of an
//! error value.

pub mod admin;
pub mod applications;
pub mod gigs;
pub mod messaging;
pub mod notifications;
pub mod session;
pub mod transactions;

use gigboard_store::Database;
use serde::Serialize;

use crate::state::{Session, SharedState};

/// `{ success, data?, error? }` envelope returned by every command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), _) if self.success => Ok(data),
            (_, Some(error)) => Err(error),
            _ => Err("Command returned no data".to_string()),
        }
    }
}

impl<T> From<Result<T, String>> for CommandResult<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                tracing::debug!(error = %e, "command failed");
                Self::err(e)
            }
        }
    }
}

/// Clone the store handle out of the state so the lock is not held while
/// the store works.
pub(crate) fn database(state: &SharedState) -> Result<Database, String> {
    let guard = state.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    Ok(guard.database.clone())
}

pub(crate) fn session(state: &SharedState) -> Result<Session, String> {
    let guard = state.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    guard.session().cloned()
}

pub(crate) fn database_and_session(state: &SharedState) -> Result<(Database, Session), String> {
    let guard = state.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    let session = guard.session()?.clone();
    Ok((guard.database.clone(), session))
}
