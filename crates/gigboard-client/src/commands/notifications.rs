use gigboard_store::Notification;

use crate::commands::{database_and_session, CommandResult};
use crate::state::SharedState;

/// Feed of the signed-in user's role, newest first.
pub fn list_notifications(state: &SharedState) -> CommandResult<Vec<Notification>> {
    database_and_session(state)
        .map(|(db, session)| db.list_notifications(session.role))
        .into()
}

pub fn unread_count(state: &SharedState) -> CommandResult<usize> {
    database_and_session(state)
        .map(|(db, session)| db.unread_count(session.role))
        .into()
}

pub fn mark_notification_read(state: &SharedState, notification_id: String) -> CommandResult<Notification> {
    let result = database_and_session(state).and_then(|(db, session)| {
        db.mark_read(session.role, &notification_id)
            .map_err(|e| format!("Failed to mark notification: {e}"))
    });
    result.into()
}

pub fn mark_all_read(state: &SharedState) -> CommandResult<usize> {
    let result = database_and_session(state).and_then(|(db, session)| {
        db.mark_all_read(session.role)
            .map_err(|e| format!("Failed to mark notifications: {e}"))
    });
    result.into()
}

pub fn clear_notifications(state: &SharedState) -> CommandResult<()> {
    let result = database_and_session(state).and_then(|(db, session)| {
        db.clear_notifications(session.role)
            .map_err(|e| format!("Failed to clear notifications: {e}"))
    });
    result.into()
}
