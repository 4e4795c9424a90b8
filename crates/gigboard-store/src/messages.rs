//! Message records and the conversation preview they keep current.

use gigboard_shared::{ids, IdPrefix};

use crate::database::Database;
use crate::error::Result;
use crate::models::{Conversation, Message, MessagePatch, NewMessage};

impl Database {
    /// Append a message and refresh its conversation's preview.
    ///
    /// The conversation's `lastMessage` and `updatedAt` are overwritten with
    /// the message's content and timestamp. That update is best effort: a
    /// missing conversation or a failed write is logged and the message is
    /// kept.
    pub fn create_message(&self, new: NewMessage) -> Result<Message> {
        let message = Message {
            id: ids::generate(IdPrefix::Message),
            conversation_id: new.conversation_id,
            sender_id: new.sender_id,
            sender_name: new.sender_name,
            content: new.content,
            timestamp: self.now(),
            updated_at: None,
        };

        let message = self.insert_record(message)?;

        if let Err(e) = self.sync_conversation_preview(&message) {
            tracing::warn!(
                conversation = %message.conversation_id,
                error = %e,
                "conversation preview not updated"
            );
        }

        self.notify_changed();
        Ok(message)
    }

    fn sync_conversation_preview(&self, message: &Message) -> Result<()> {
        let mut conversations = self.load_records::<Conversation>()?;
        let Some(conversation) = conversations
            .records_mut()
            .find(|c| c.id == message.conversation_id)
        else {
            tracing::debug!(conversation = %message.conversation_id, "message for unknown conversation");
            return Ok(());
        };

        conversation.last_message = message.content.clone();
        conversation.updated_at = message.timestamp;
        self.save_records(&conversations)
    }

    pub fn list_messages(&self) -> Vec<Message> {
        self.list()
    }

    pub fn get_message(&self, id: &str) -> Result<Message> {
        self.find(id)
    }

    pub fn update_message(&self, id: &str, patch: MessagePatch) -> Result<Message> {
        let message = self.update_record(id, patch)?;
        self.notify_changed();
        Ok(message)
    }

    pub fn delete_message(&self, id: &str) -> Result<Message> {
        let message = self.remove_record(id)?;
        self.notify_changed();
        Ok(message)
    }
}
