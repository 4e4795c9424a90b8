//! CRUD operations for [`Conversation`] records.

use gigboard_shared::{ids, IdPrefix};

use crate::database::Database;
use crate::error::Result;
use crate::models::{Conversation, ConversationPatch, NewConversation};

impl Database {
    /// Insert a conversation as given. No uniqueness check; see
    /// [`Database::get_or_create_conversation`] for the checked path.
    pub fn create_conversation(&self, new: NewConversation) -> Result<Conversation> {
        let now = self.now();
        let conversation = Conversation {
            id: ids::generate(IdPrefix::Conversation),
            participants: new.participants,
            participant_names: new.participant_names,
            gig_id: new.gig_id,
            gig_title: new.gig_title,
            last_message: String::new(),
            created_at: now,
            updated_at: now,
        };

        let conversation = self.insert_record(conversation)?;
        self.notify_changed();
        Ok(conversation)
    }

    pub fn list_conversations(&self) -> Vec<Conversation> {
        self.list()
    }

    pub fn get_conversation(&self, id: &str) -> Result<Conversation> {
        self.find(id)
    }

    /// The conversation about `gig_id` between `a` and `b`, in either order.
    pub fn find_conversation(&self, gig_id: &str, a: &str, b: &str) -> Option<Conversation> {
        self.list_conversations()
            .into_iter()
            .find(|c| c.gig_id == gig_id && c.is_between(a, b))
    }

    /// Return the existing conversation for this gig and pair, or create one.
    pub fn get_or_create_conversation(&self, new: NewConversation) -> Result<Conversation> {
        let [a, b] = &new.participants;
        if let Some(existing) = self.find_conversation(&new.gig_id, a, b) {
            tracing::debug!(conversation = %existing.id, "reusing conversation");
            return Ok(existing);
        }
        self.create_conversation(new)
    }

    pub fn update_conversation(&self, id: &str, patch: ConversationPatch) -> Result<Conversation> {
        let conversation = self.update_record(id, patch)?;
        self.notify_changed();
        Ok(conversation)
    }

    /// Remove one conversation. Its messages are left in place; only gig
    /// deletion cascades.
    pub fn delete_conversation(&self, id: &str) -> Result<Conversation> {
        let conversation = self.remove_record(id)?;
        self.notify_changed();
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn between(gig: &str, a: &str, b: &str) -> NewConversation {
        NewConversation {
            participants: [a.into(), b.into()],
            participant_names: BTreeMap::from([
                (a.to_string(), format!("User {a}")),
                (b.to_string(), format!("User {b}")),
            ]),
            gig_id: gig.into(),
            gig_title: "Tutor".into(),
        }
    }

    #[test]
    fn create_starts_with_empty_preview() {
        let db = Database::in_memory();
        let conversation = db.create_conversation(between("gig_1", "c1", "s1")).unwrap();

        assert!(conversation.id.starts_with("conv_"));
        assert!(conversation.last_message.is_empty());
        assert_eq!(conversation.created_at, conversation.updated_at);
        assert_eq!(conversation.participant_names["s1"], "User s1");
    }

    #[test]
    fn get_or_create_reuses_pair_in_either_order() {
        let db = Database::in_memory();
        let first = db
            .get_or_create_conversation(between("gig_1", "c1", "s1"))
            .unwrap();
        let again = db
            .get_or_create_conversation(between("gig_1", "s1", "c1"))
            .unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(db.list_conversations().len(), 1);
    }

    #[test]
    fn get_or_create_separates_gigs() {
        let db = Database::in_memory();
        db.get_or_create_conversation(between("gig_1", "c1", "s1"))
            .unwrap();
        db.get_or_create_conversation(between("gig_2", "c1", "s1"))
            .unwrap();

        assert_eq!(db.list_conversations().len(), 2);
    }

    #[test]
    fn update_missing_conversation_is_not_found() {
        let db = Database::in_memory();
        let err = db
            .update_conversation("conv_missing", ConversationPatch::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
