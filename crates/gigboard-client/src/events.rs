use std::sync::Arc;

use gigboard_store::{ChangeBus, DataChanged};
use serde::Serialize;

use crate::refresh::ChangeSubscription;

pub const EVENT_DATA_CHANGED: &str = "data-changed";
pub const EVENT_SESSION_CHANGED: &str = "session-changed";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataChangedPayload {
    pub generation: u64,
}

impl From<DataChanged> for DataChangedPayload {
    fn from(signal: DataChanged) -> Self {
        Self {
            generation: signal.generation,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

/// Whatever renders the UI. Receives named events with a JSON payload.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: serde_json::Value) -> Result<(), String>;
}

pub fn emit_event<S: Serialize>(sink: &dyn EventSink, event: &str, payload: S) {
    let value = match serde_json::to_value(payload) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(event, error = %e, "Failed to serialize event payload");
            return;
        }
    };
    if let Err(e) = sink.emit(event, value) {
        tracing::error!(event, error = %e, "Failed to emit event");
    }
}

/// Re-emit every store change as [`EVENT_DATA_CHANGED`] on `sink` for as
/// long as the returned subscription lives.
pub fn forward_changes(bus: &ChangeBus, sink: Arc<dyn EventSink>) -> ChangeSubscription {
    ChangeSubscription::new(bus, move |signal| {
        emit_event(sink.as_ref(), EVENT_DATA_CHANGED, DataChangedPayload::from(signal));
    })
}
