//! Gig deletion cascade.
//!
//! Removing a gig also removes, in order:
//! 1. the gig itself,
//! 2. every application for the gig,
//! 3. every conversation attached to the gig,
//! 4. every message in one of those conversations.
//!
//! The conversation ids are captured before step 3 writes, since step 4
//! needs them. Each step is its own collection write; there is no rollback,
//! so when a later step fails the earlier ones stay applied and the caller
//! gets [`StoreError::PartialCascade`]. The change signal fires once at the
//! end whenever anything was removed.

use std::collections::HashSet;

use serde::Serialize;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Application, Conversation, Gig, Message};

/// Counts of what a cascade removed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub gig_id: String,
    pub applications_removed: usize,
    pub conversations_removed: usize,
    pub messages_removed: usize,
}

/// Records still referring to a deleted gig.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeResidue {
    pub applications: Vec<String>,
    pub conversations: Vec<String>,
    /// Messages whose conversation no longer exists.
    pub orphaned_messages: Vec<String>,
}

impl CascadeResidue {
    pub fn is_clean(&self) -> bool {
        self.applications.is_empty()
            && self.conversations.is_empty()
            && self.orphaned_messages.is_empty()
    }
}

impl Database {
    /// Delete a gig and everything that hangs off it.
    pub fn delete_gig(&self, id: &str) -> Result<CascadeReport> {
        self.remove_record::<Gig>(id)?;

        let mut report = CascadeReport {
            gig_id: id.to_string(),
            ..Default::default()
        };
        let outcome = self.remove_gig_dependents(id, &mut report);

        self.notify_changed();

        match outcome {
            Ok(()) => {
                tracing::info!(
                    gig = id,
                    applications = report.applications_removed,
                    conversations = report.conversations_removed,
                    messages = report.messages_removed,
                    "gig deleted"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(gig = id, ?report, error = %e, "gig cascade incomplete");
                Err(StoreError::PartialCascade {
                    gig_id: id.to_string(),
                    source: Box::new(e),
                })
            }
        }
    }

    fn remove_gig_dependents(&self, gig_id: &str, report: &mut CascadeReport) -> Result<()> {
        let applications = self.remove_where::<Application, _>(|a| a.gig_id == gig_id)?;
        report.applications_removed = applications.len();

        let conversation_ids: HashSet<String> = self
            .list::<Conversation>()
            .into_iter()
            .filter(|c| c.gig_id == gig_id)
            .map(|c| c.id)
            .collect();

        let conversations =
            self.remove_where::<Conversation, _>(|c| conversation_ids.contains(&c.id))?;
        report.conversations_removed = conversations.len();

        let messages =
            self.remove_where::<Message, _>(|m| conversation_ids.contains(&m.conversation_id))?;
        report.messages_removed = messages.len();

        Ok(())
    }

    /// Look for anything a cascade for `gig_id` should have removed.
    pub fn verify_gig_cascade(&self, gig_id: &str) -> CascadeResidue {
        let conversations: Vec<Conversation> = self.list();
        let live_conversations: HashSet<&str> =
            conversations.iter().map(|c| c.id.as_str()).collect();

        CascadeResidue {
            applications: self
                .list::<Application>()
                .into_iter()
                .filter(|a| a.gig_id == gig_id)
                .map(|a| a.id)
                .collect(),
            conversations: conversations
                .iter()
                .filter(|c| c.gig_id == gig_id)
                .map(|c| c.id.clone())
                .collect(),
            orphaned_messages: self
                .list::<Message>()
                .into_iter()
                .filter(|m| !live_conversations.contains(m.conversation_id.as_str()))
                .map(|m| m.id)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::FailingKey;
    use crate::backend::KeyValueBackend;
    use crate::models::{NewApplication, NewConversation, NewGig, NewMessage};
    use std::sync::Arc;

    struct Fixture {
        gig: Gig,
        application: Application,
        conversation: Conversation,
        message: Message,
    }

    fn populate(db: &Database, owner: &str, student: &str) -> Fixture {
        let gig = db
            .create_gig(NewGig {
                title: "Tutor".into(),
                pay: 500.0,
                owner_id: owner.into(),
                ..Default::default()
            })
            .unwrap();
        let application = db
            .create_application(NewApplication {
                gig_id: gig.id.clone(),
                user_id: student.into(),
                proposal: "I can help".into(),
            })
            .unwrap();
        let conversation = db
            .create_conversation(NewConversation {
                participants: [owner.into(), student.into()],
                gig_id: gig.id.clone(),
                gig_title: gig.title.clone(),
                ..Default::default()
            })
            .unwrap();
        let message = db
            .create_message(NewMessage {
                conversation_id: conversation.id.clone(),
                sender_id: owner.into(),
                sender_name: "Client".into(),
                content: "Hello".into(),
            })
            .unwrap();
        Fixture {
            gig,
            application,
            conversation,
            message,
        }
    }

    #[test]
    fn cascade_removes_only_dependents_of_the_gig() {
        let db = Database::in_memory();
        let doomed = populate(&db, "c1", "s1");
        let survivor = populate(&db, "c2", "s2");

        let report = db.delete_gig(&doomed.gig.id).unwrap();

        assert_eq!(report.applications_removed, 1);
        assert_eq!(report.conversations_removed, 1);
        assert_eq!(report.messages_removed, 1);
        assert!(db.verify_gig_cascade(&doomed.gig.id).is_clean());

        assert_eq!(db.list_gigs(), vec![survivor.gig]);
        assert_eq!(db.list_applications(), vec![survivor.application]);
        assert_eq!(db.list_messages(), vec![survivor.message]);
        let conversations = db.list_conversations();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].id, survivor.conversation.id);
    }

    #[test]
    fn cascade_signals_once() {
        let db = Database::in_memory();
        let fixture = populate(&db, "c1", "s1");
        let before = db.bus().generation();

        db.delete_gig(&fixture.gig.id).unwrap();

        assert_eq!(db.bus().generation(), before + 1);
    }

    #[test]
    fn deleting_missing_gig_touches_nothing() {
        let db = Database::in_memory();
        let fixture = populate(&db, "c1", "s1");
        let before = db.bus().generation();

        let err = db.delete_gig("gig_missing").unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(db.list_gigs().len(), 1);
        assert_eq!(db.list_applications(), vec![fixture.application]);
        assert_eq!(db.bus().generation(), before);
    }

    #[test]
    fn failed_step_keeps_earlier_steps_applied() {
        let backend = Arc::new(FailingKey::default());
        let db = Database::new(Arc::clone(&backend) as Arc<dyn KeyValueBackend>);
        let fixture = populate(&db, "c1", "s1");
        backend.fail_writes_to("conversations");

        let err = db.delete_gig(&fixture.gig.id).unwrap_err();

        assert!(matches!(err, StoreError::PartialCascade { .. }));
        assert!(db.list_gigs().is_empty());
        assert!(db.list_applications().is_empty());
        assert_eq!(db.list_conversations().len(), 1);
        assert_eq!(db.list_messages(), vec![fixture.message]);

        let residue = db.verify_gig_cascade(&fixture.gig.id);
        assert_eq!(residue.conversations, vec![fixture.conversation.id]);
        assert!(!residue.is_clean());
    }
}
