//! Moderation and maintenance commands. All of them require an admin session.

use chrono::{DateTime, Utc};
use gigboard_shared::{NotificationKind, Role};
use gigboard_store::{
    CascadeReport, CascadeResidue, Database, Gig, ImportStats, Notification, SeedReport, Snapshot,
};
use tracing::{info, warn};

use crate::commands::{database_and_session, CommandResult};
use crate::state::SharedState;

fn admin_database(state: &SharedState) -> Result<Database, String> {
    let (db, session) = database_and_session(state)?;
    if session.role != Role::Admin {
        warn!(user = %session.user_id, role = %session.role, "Admin command refused");
        return Err("Admin role required".to_string());
    }
    Ok(db)
}

pub fn schedule_gig_removal(
    state: &SharedState,
    gig_id: String,
    at: DateTime<Utc>,
    moderation_note: Option<String>,
) -> CommandResult<Gig> {
    let result = admin_database(state).and_then(|db| {
        db.schedule_gig_removal(&gig_id, at, moderation_note)
            .map_err(|e| format!("Failed to schedule removal: {e}"))
    });
    result.into()
}

pub fn cancel_gig_removal(state: &SharedState, gig_id: String) -> CommandResult<Gig> {
    let result = admin_database(state).and_then(|db| {
        db.cancel_gig_removal(&gig_id)
            .map_err(|e| format!("Failed to cancel removal: {e}"))
    });
    result.into()
}

/// Delete every gig whose scheduled removal time has passed.
pub fn purge_due_removals(state: &SharedState) -> CommandResult<Vec<CascadeReport>> {
    let result = admin_database(state).map(|db| {
        let reports = db.purge_scheduled_removals(Utc::now());
        info!(count = reports.len(), "Scheduled removals purged");
        reports
    });
    result.into()
}

/// Records still pointing at a deleted gig. Empty after a clean cascade.
pub fn verify_gig_cascade(state: &SharedState, gig_id: String) -> CommandResult<CascadeResidue> {
    admin_database(state)
        .map(|db| db.verify_gig_cascade(&gig_id))
        .into()
}

pub fn broadcast_notification(
    state: &SharedState,
    role: String,
    title: String,
    message: String,
    kind: String,
) -> CommandResult<Notification> {
    let result = admin_database(state).and_then(|db| {
        let role = role.parse::<Role>().map_err(|e| e.to_string())?;
        db.notify(role, &title, &message, NotificationKind::from(kind))
            .map_err(|e| format!("Failed to send notification: {e}"))
    });
    result.into()
}

pub fn seed_store(state: &SharedState) -> CommandResult<SeedReport> {
    let result = admin_database(state).and_then(|db| {
        db.initialize_if_absent()
            .map_err(|e| format!("Failed to seed store: {e}"))
    });
    result.into()
}

pub fn reset_store(state: &SharedState) -> CommandResult<()> {
    let result = admin_database(state).and_then(|db| {
        db.reset().map_err(|e| format!("Failed to reset store: {e}"))
    });

    if result.is_ok() {
        warn!("Store reset by admin");
    }
    result.into()
}

/// Export every collection as a pretty-printed JSON string.
pub fn export_snapshot(state: &SharedState) -> CommandResult<String> {
    let result = admin_database(state).and_then(|db| {
        let snapshot = db.export_snapshot();
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| format!("Serialization failed: {e}"))?;

        info!(
            gigs = snapshot.gigs.len(),
            applications = snapshot.applications.len(),
            messages = snapshot.messages.len(),
            "Snapshot exported"
        );
        Ok(json)
    });
    result.into()
}

/// Merge a snapshot produced by [`export_snapshot`]. Existing ids win.
pub fn import_snapshot(state: &SharedState, json: String) -> CommandResult<ImportStats> {
    let result = admin_database(state).and_then(|db| {
        let snapshot: Snapshot =
            serde_json::from_str(&json).map_err(|e| format!("Invalid snapshot: {e}"))?;
        db.import_snapshot(&snapshot)
            .map_err(|e| format!("Import failed: {e}"))
    });
    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{signed_in, switch_user};
    use chrono::Duration;
    use gigboard_store::NewGig;

    fn gig(state: &SharedState) -> Gig {
        crate::commands::database(state)
            .unwrap()
            .create_gig(NewGig {
                title: "Spam".into(),
                owner_id: "c1".into(),
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn non_admins_are_refused() {
        let client = signed_in("c1", Role::Client);
        let result = reset_store(&client);
        assert_eq!(result.error.as_deref(), Some("Admin role required"));
    }

    #[test]
    fn scheduled_removal_is_purged_when_due() {
        let admin = signed_in("a1", Role::Admin);
        let due = gig(&admin);
        let later = gig(&admin);

        schedule_gig_removal(
            &admin,
            due.id.clone(),
            Utc::now() - Duration::minutes(1),
            Some("policy".into()),
        )
        .into_result()
        .unwrap();
        schedule_gig_removal(&admin, later.id.clone(), Utc::now() + Duration::days(1), None)
            .into_result()
            .unwrap();

        let reports = purge_due_removals(&admin).into_result().unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].gig_id, due.id);
        assert!(verify_gig_cascade(&admin, due.id).data.unwrap().is_clean());
        assert!(cancel_gig_removal(&admin, later.id).success);
    }

    #[test]
    fn snapshot_round_trips_between_stores() {
        let admin = signed_in("a1", Role::Admin);
        gig(&admin);
        let json = export_snapshot(&admin).into_result().unwrap();

        let fresh = signed_in("a2", Role::Admin);
        let stats = import_snapshot(&fresh, json).into_result().unwrap();
        assert_eq!(stats.gigs_imported, 1);

        let garbage = import_snapshot(&fresh, "{not json".into());
        assert!(garbage.error.unwrap().starts_with("Invalid snapshot"));
    }

    #[test]
    fn broadcast_reaches_target_role() {
        let admin = signed_in("a1", Role::Admin);
        let student = switch_user(&admin, "s1", Role::Student);

        broadcast_notification(
            &admin,
            "student".into(),
            "Maintenance".into(),
            "Tonight".into(),
            "warning".into(),
        )
        .into_result()
        .unwrap();

        let feed = crate::commands::notifications::list_notifications(&student)
            .into_result()
            .unwrap();
        assert_eq!(feed[0].kind, NotificationKind::Warning);
    }

    #[test]
    fn seed_then_reset() {
        let admin = signed_in("a1", Role::Admin);
        assert!(!seed_store(&admin).into_result().unwrap().is_noop());
        assert!(seed_store(&admin).into_result().unwrap().is_noop());

        gig(&admin);
        reset_store(&admin).into_result().unwrap();
        let db = crate::commands::database(&admin).unwrap();
        assert!(db.list_gigs().is_empty());
    }
}
