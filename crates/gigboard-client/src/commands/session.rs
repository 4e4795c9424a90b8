use gigboard_shared::Role;
use tracing::info;

use crate::commands::CommandResult;
use crate::events::{emit_event, EventSink, SessionPayload, EVENT_SESSION_CHANGED};
use crate::state::{Session, SharedState};

pub fn sign_in(
    state: &SharedState,
    sink: &dyn EventSink,
    user_id: String,
    display_name: String,
    role: String,
) -> CommandResult<Session> {
    let result = start_session(state, user_id, display_name, &role);

    if let Ok(session) = &result {
        info!(user = %session.user_id, role = %session.role, "Signed in");
        emit_event(
            sink,
            EVENT_SESSION_CHANGED,
            SessionPayload {
                user_id: Some(session.user_id.clone()),
                role: Some(session.role.to_string()),
            },
        );
    }
    result.into()
}

fn start_session(
    state: &SharedState,
    user_id: String,
    display_name: String,
    role: &str,
) -> Result<Session, String> {
    if user_id.trim().is_empty() {
        return Err("User id must not be empty".to_string());
    }
    let role = role.parse::<Role>().map_err(|e| e.to_string())?;
    let session = Session {
        user_id,
        display_name,
        role,
    };

    let mut guard = state.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    guard.current_user = Some(session.clone());
    Ok(session)
}

pub fn sign_out(state: &SharedState, sink: &dyn EventSink) -> CommandResult<()> {
    let result = state
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))
        .map(|mut guard| {
            guard.current_user = None;
        });

    if result.is_ok() {
        emit_event(
            sink,
            EVENT_SESSION_CHANGED,
            SessionPayload {
                user_id: None,
                role: None,
            },
        );
    }
    result.into()
}

pub fn current_session(state: &SharedState) -> CommandResult<Option<Session>> {
    state
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))
        .map(|guard| guard.current_user.clone())
        .into()
}
