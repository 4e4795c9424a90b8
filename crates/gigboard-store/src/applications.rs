//! CRUD operations for [`Application`] records.

use gigboard_shared::{ids, ApplicationStatus, GigStatus, IdPrefix, NotificationKind, Role};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Application, ApplicationPatch, Gig, NewApplication};

impl Database {
    /// Insert an application as given. No uniqueness check; see
    /// [`Database::apply_to_gig`] for the checked path.
    pub fn create_application(&self, new: NewApplication) -> Result<Application> {
        let application = self.insert_record(self.pending_application(new))?;
        self.notify_changed();
        Ok(application)
    }

    pub fn list_applications(&self) -> Vec<Application> {
        self.list()
    }

    pub fn get_application(&self, id: &str) -> Result<Application> {
        self.find(id)
    }

    /// The application `user_id` made for `gig_id`, if any.
    pub fn find_application(&self, gig_id: &str, user_id: &str) -> Option<Application> {
        self.list_applications()
            .into_iter()
            .find(|a| a.gig_id == gig_id && a.user_id == user_id)
    }

    pub fn update_application(&self, id: &str, patch: ApplicationPatch) -> Result<Application> {
        let application = self.update_record(id, patch)?;
        self.notify_changed();
        Ok(application)
    }

    pub fn delete_application(&self, id: &str) -> Result<Application> {
        let application = self.remove_record(id)?;
        self.notify_changed();
        Ok(application)
    }

    /// Apply to a gig, refusing a second application by the same user.
    pub fn apply_to_gig(&self, gig_id: &str, user_id: &str, proposal: &str) -> Result<Application> {
        let gig: Gig = self.find(gig_id)?;

        if matches!(gig.status, GigStatus::Closed | GigStatus::Hired) {
            return Err(StoreError::Invalid(format!(
                "gig {gig_id} is not accepting applications ({})",
                gig.status
            )));
        }

        if let Some(existing) = self.find_application(gig_id, user_id) {
            return Err(StoreError::AlreadyExists {
                collection: "Application",
                id: existing.id,
            });
        }

        let application = self.insert_record(self.pending_application(NewApplication {
            gig_id: gig_id.to_string(),
            user_id: user_id.to_string(),
            proposal: proposal.to_string(),
        }))?;

        self.notify_best_effort(
            Role::Client,
            "New application",
            &format!("Someone applied to \"{}\"", gig.title),
            NotificationKind::Info,
        );
        self.notify_changed();

        Ok(application)
    }

    /// Mark an application hired and its gig hired.
    pub fn hire_applicant(&self, application_id: &str) -> Result<Application> {
        let application: Application = self.find(application_id)?;
        let gig: Gig = self.find(&application.gig_id)?;

        let application = self.update_record(
            application_id,
            ApplicationPatch {
                status: Some(ApplicationStatus::Hired),
                ..Default::default()
            },
        )?;
        if let Err(e) = self.modify_record(&gig.id, |g: &mut Gig| g.status = GigStatus::Hired) {
            tracing::warn!(gig = %gig.id, application = application_id, error = %e, "hire stopped partway");
            self.notify_changed();
            return Err(e);
        }

        tracing::info!(gig = %gig.id, user = %application.user_id, "applicant hired");
        self.notify_best_effort(
            Role::Student,
            "You're hired!",
            &format!("You were hired for \"{}\"", gig.title),
            NotificationKind::Success,
        );
        self.notify_changed();

        Ok(application)
    }

    fn pending_application(&self, new: NewApplication) -> Application {
        let now = self.now();
        Application {
            id: ids::generate(IdPrefix::Application),
            gig_id: new.gig_id,
            user_id: new.user_id,
            proposal: new.proposal,
            status: ApplicationStatus::Pending,
            applied_at: now,
            updated_at: now,
        }
    }

    pub fn reject_application(&self, application_id: &str) -> Result<Application> {
        self.update_application(
            application_id,
            ApplicationPatch {
                status: Some(ApplicationStatus::Rejected),
                ..Default::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::FailingKey;
    use crate::backend::KeyValueBackend;
    use crate::models::NewGig;
    use std::sync::Arc;

    fn open_gig(db: &Database) -> Gig {
        db.create_gig(NewGig {
            title: "Tutor".into(),
            pay: 200.0,
            owner_id: "c1".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn create_stamps_pending_and_timestamps() {
        let db = Database::in_memory();
        let gig = open_gig(&db);
        let application = db
            .create_application(NewApplication {
                gig_id: gig.id.clone(),
                user_id: "s1".into(),
                proposal: "pick me".into(),
            })
            .unwrap();

        assert!(application.id.starts_with("app_"));
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert_eq!(application.applied_at, application.updated_at);
        assert_eq!(db.list_applications(), vec![application]);
    }

    #[test]
    fn second_application_by_same_user_is_refused() {
        let db = Database::in_memory();
        let gig = open_gig(&db);

        let first = db.apply_to_gig(&gig.id, "s1", "first").unwrap();
        let err = db.apply_to_gig(&gig.id, "s1", "again").unwrap_err();

        match err {
            StoreError::AlreadyExists { id, .. } => assert_eq!(id, first.id),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(db.list_applications().len(), 1);

        // a different student is fine
        db.apply_to_gig(&gig.id, "s2", "me too").unwrap();
        assert_eq!(db.list_applications().len(), 2);
    }

    #[test]
    fn applying_notifies_clients() {
        let db = Database::in_memory();
        let gig = open_gig(&db);

        db.apply_to_gig(&gig.id, "s1", "hello").unwrap();

        assert_eq!(db.unread_count(Role::Client), 1);
    }

    #[test]
    fn hiring_updates_application_and_gig() {
        let db = Database::in_memory();
        let gig = open_gig(&db);
        let application = db.apply_to_gig(&gig.id, "s1", "hello").unwrap();

        let hired = db.hire_applicant(&application.id).unwrap();

        assert_eq!(hired.status, ApplicationStatus::Hired);
        assert!(hired.updated_at >= application.updated_at);
        assert_eq!(db.get_gig(&gig.id).unwrap().status, GigStatus::Hired);
        assert!(db.apply_to_gig(&gig.id, "s2", "late").is_err());
    }

    #[test]
    fn workflow_steps_signal_once_each() {
        let db = Database::in_memory();
        let gig = open_gig(&db);

        let before = db.bus().generation();
        let application = db.apply_to_gig(&gig.id, "s1", "hello").unwrap();
        assert_eq!(db.bus().generation(), before + 1);

        db.hire_applicant(&application.id).unwrap();
        assert_eq!(db.bus().generation(), before + 2);
        assert_eq!(db.unread_count(Role::Student), 1);
    }

    #[test]
    fn failed_hire_still_signals_the_applied_step() {
        let backend = Arc::new(FailingKey::default());
        let db = Database::new(Arc::clone(&backend) as Arc<dyn KeyValueBackend>);
        let gig = open_gig(&db);
        let application = db.apply_to_gig(&gig.id, "s1", "hello").unwrap();
        backend.fail_writes_to("gigs");
        let before = db.bus().generation();

        assert!(db.hire_applicant(&application.id).is_err());

        assert_eq!(db.bus().generation(), before + 1);
        assert_eq!(
            db.get_application(&application.id).unwrap().status,
            ApplicationStatus::Hired
        );
        assert_eq!(db.get_gig(&gig.id).unwrap().status, GigStatus::Open);
    }

    #[test]
    fn delete_missing_application_is_not_found() {
        let db = Database::in_memory();
        let gig = open_gig(&db);
        db.apply_to_gig(&gig.id, "s1", "hello").unwrap();
        let before = db.list_applications();

        assert!(db.delete_application("app_missing").unwrap_err().is_not_found());
        assert_eq!(db.list_applications(), before);
    }
}
