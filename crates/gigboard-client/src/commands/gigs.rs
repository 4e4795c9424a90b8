use gigboard_shared::GigStatus;
use gigboard_store::{CascadeReport, Gig, GigPatch, NewGig};
use tracing::info;

use crate::commands::{database, database_and_session, CommandResult};
use crate::state::SharedState;

pub fn list_gigs(state: &SharedState) -> CommandResult<Vec<Gig>> {
    database(state).map(|db| db.list_gigs()).into()
}

/// Gigs still taking applications.
pub fn list_open_gigs(state: &SharedState) -> CommandResult<Vec<Gig>> {
    database(state).map(|db| db.open_gigs()).into()
}

pub fn my_gigs(state: &SharedState) -> CommandResult<Vec<Gig>> {
    database_and_session(state)
        .map(|(db, session)| db.gigs_by_owner(&session.user_id))
        .into()
}

pub fn get_gig(state: &SharedState, gig_id: String) -> CommandResult<Gig> {
    let result = database(state).and_then(|db| {
        db.get_gig(&gig_id)
            .map_err(|e| format!("Failed to load gig: {e}"))
    });
    result.into()
}

/// Post a gig owned by the signed-in user.
pub fn post_gig(state: &SharedState, mut new: NewGig) -> CommandResult<Gig> {
    let result = database_and_session(state).and_then(|(db, session)| {
        if new.title.trim().is_empty() {
            return Err("Title must not be empty".to_string());
        }
        if !new.pay.is_finite() || new.pay < 0.0 {
            return Err(format!("Invalid pay: {}", new.pay));
        }
        new.owner_id = session.user_id;
        db.create_gig(new)
            .map_err(|e| format!("Failed to post gig: {e}"))
    });

    if let Ok(gig) = &result {
        info!(gig = %gig.id, owner = %gig.owner_id, "Gig posted");
    }
    result.into()
}

pub fn update_gig(state: &SharedState, gig_id: String, patch: GigPatch) -> CommandResult<Gig> {
    let result = database(state).and_then(|db| {
        db.update_gig(&gig_id, patch)
            .map_err(|e| format!("Failed to update gig: {e}"))
    });
    result.into()
}

pub fn set_gig_status(state: &SharedState, gig_id: String, status: String) -> CommandResult<Gig> {
    let result = database(state).and_then(|db| {
        db.set_gig_status(&gig_id, GigStatus::from(status))
            .map_err(|e| format!("Failed to update gig: {e}"))
    });
    result.into()
}

/// Delete a gig along with its applications, conversations and messages.
pub fn delete_gig(state: &SharedState, gig_id: String) -> CommandResult<CascadeReport> {
    let result = database(state).and_then(|db| {
        db.delete_gig(&gig_id)
            .map_err(|e| format!("Failed to delete gig: {e}"))
    });

    if let Ok(report) = &result {
        info!(
            gig = %report.gig_id,
            applications = report.applications_removed,
            conversations = report.conversations_removed,
            messages = report.messages_removed,
            "Gig deleted"
        );
    }
    result.into()
}
