use gigboard_store::Application;
use tracing::info;

use crate::commands::{database, database_and_session, CommandResult};
use crate::state::SharedState;

pub fn apply_to_gig(state: &SharedState, gig_id: String, proposal: String) -> CommandResult<Application> {
    let result = database_and_session(state).and_then(|(db, session)| {
        db.apply_to_gig(&gig_id, &session.user_id, &proposal)
            .map_err(|e| format!("Failed to apply: {e}"))
    });

    if let Ok(application) = &result {
        info!(gig = %application.gig_id, application = %application.id, "Applied to gig");
    }
    result.into()
}

pub fn my_applications(state: &SharedState) -> CommandResult<Vec<Application>> {
    database_and_session(state)
        .map(|(db, session)| db.applications_by_user(&session.user_id))
        .into()
}

/// Applications received on gigs the signed-in client owns.
pub fn applications_for_my_gigs(state: &SharedState) -> CommandResult<Vec<Application>> {
    database_and_session(state)
        .map(|(db, session)| db.applications_for_client(&session.user_id))
        .into()
}

pub fn applications_for_gig(state: &SharedState, gig_id: String) -> CommandResult<Vec<Application>> {
    database(state)
        .map(|db| db.applications_by_gig(&gig_id))
        .into()
}

pub fn hire_applicant(state: &SharedState, application_id: String) -> CommandResult<Application> {
    let result = database(state).and_then(|db| {
        db.hire_applicant(&application_id)
            .map_err(|e| format!("Failed to hire applicant: {e}"))
    });
    result.into()
}

pub fn reject_application(state: &SharedState, application_id: String) -> CommandResult<Application> {
    let result = database(state).and_then(|db| {
        db.reject_application(&application_id)
            .map_err(|e| format!("Failed to reject application: {e}"))
    });
    result.into()
}

/// Withdraw one of the signed-in user's own applications.
pub fn withdraw_application(state: &SharedState, application_id: String) -> CommandResult<Application> {
    let result = database_and_session(state).and_then(|(db, session)| {
        let application = db
            .get_application(&application_id)
            .map_err(|e| format!("Failed to load application: {e}"))?;
        if application.user_id != session.user_id {
            return Err("Not your application".to_string());
        }
        db.delete_application(&application_id)
            .map_err(|e| format!("Failed to withdraw application: {e}"))
    });
    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::gigs::post_gig;
    use crate::commands::tests::{signed_in, switch_user};
    use gigboard_shared::{ApplicationStatus, Role};
    use gigboard_store::NewGig;

    fn posted(title: &str) -> (crate::state::SharedState, String) {
        let client = signed_in("c1", Role::Client);
        let gig = post_gig(
            &client,
            NewGig {
                title: title.into(),
                pay: 60.0,
                ..Default::default()
            },
        )
        .into_result()
        .unwrap();
        (client, gig.id)
    }

    #[test]
    fn student_applies_and_client_hires() {
        let (client, gig_id) = posted("Flyers");
        let student = switch_user(&client, "s1", Role::Student);

        let application = apply_to_gig(&student, gig_id.clone(), "Pick me".into())
            .into_result()
            .unwrap();
        assert_eq!(my_applications(&student).data.unwrap(), vec![application.clone()]);
        assert_eq!(applications_for_my_gigs(&client).data.unwrap().len(), 1);

        let hired = hire_applicant(&client, application.id).into_result().unwrap();
        assert_eq!(hired.status, ApplicationStatus::Hired);
    }

    #[test]
    fn second_application_fails() {
        let (client, gig_id) = posted("Flyers");
        let student = switch_user(&client, "s1", Role::Student);

        assert!(apply_to_gig(&student, gig_id.clone(), "one".into()).success);
        let again = apply_to_gig(&student, gig_id.clone(), "two".into());

        assert!(!again.success);
        assert_eq!(applications_for_gig(&client, gig_id).data.unwrap().len(), 1);
    }

    #[test]
    fn only_the_applicant_can_withdraw() {
        let (client, gig_id) = posted("Flyers");
        let student = switch_user(&client, "s1", Role::Student);
        let other = switch_user(&client, "s2", Role::Student);
        let application = apply_to_gig(&student, gig_id, "hi".into())
            .into_result()
            .unwrap();

        assert!(!withdraw_application(&other, application.id.clone()).success);
        assert!(withdraw_application(&student, application.id).success);
        assert!(my_applications(&student).data.unwrap().is_empty());
    }
}
