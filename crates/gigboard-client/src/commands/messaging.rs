use std::collections::BTreeMap;

use gigboard_store::{Conversation, Message, MessagePatch, NewConversation, NewMessage};
use serde::Serialize;
use tracing::info;

use crate::commands::{database, database_and_session, CommandResult};
use crate::state::SharedState;

/// A conversation as listed in the inbox of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub id: String,
    pub gig_id: String,
    pub gig_title: String,
    pub counterpart_id: String,
    pub counterpart_name: String,
    pub last_message: String,
    pub updated_at: String,
}

impl ConversationDto {
    fn for_user(c: Conversation, user_id: &str) -> Self {
        let counterpart_id = c.counterpart(user_id).unwrap_or_default().to_string();
        let counterpart_name = c
            .participant_names
            .get(&counterpart_id)
            .cloned()
            .unwrap_or_else(|| counterpart_id.clone());
        Self {
            id: c.id,
            gig_id: c.gig_id,
            gig_title: c.gig_title,
            counterpart_id,
            counterpart_name,
            last_message: c.last_message,
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Find or start the conversation between the signed-in user and
/// `counterpart_id` about a gig.
pub fn open_conversation(
    state: &SharedState,
    gig_id: String,
    counterpart_id: String,
    counterpart_name: String,
) -> CommandResult<Conversation> {
    let result = database_and_session(state).and_then(|(db, session)| {
        if counterpart_id == session.user_id {
            return Err("Cannot start a conversation with yourself".to_string());
        }
        let gig_title = db
            .get_gig(&gig_id)
            .map(|g| g.title)
            .unwrap_or_default();

        let mut participant_names = BTreeMap::new();
        participant_names.insert(session.user_id.clone(), session.display_name.clone());
        participant_names.insert(counterpart_id.clone(), counterpart_name);

        db.get_or_create_conversation(NewConversation {
            participants: [session.user_id, counterpart_id],
            participant_names,
            gig_id,
            gig_title,
        })
        .map_err(|e| format!("Failed to open conversation: {e}"))
    });
    result.into()
}

pub fn my_conversations(state: &SharedState) -> CommandResult<Vec<ConversationDto>> {
    database_and_session(state)
        .map(|(db, session)| {
            db.conversations_for_user(&session.user_id)
                .into_iter()
                .map(|c| ConversationDto::for_user(c, &session.user_id))
                .collect()
        })
        .into()
}

pub fn get_messages(state: &SharedState, conversation_id: String) -> CommandResult<Vec<Message>> {
    database(state)
        .map(|db| db.messages_in_conversation(&conversation_id))
        .into()
}

pub fn send_message(
    state: &SharedState,
    conversation_id: String,
    content: String,
) -> CommandResult<Message> {
    let result = database_and_session(state).and_then(|(db, session)| {
        if content.trim().is_empty() {
            return Err("Message must not be empty".to_string());
        }
        let conversation = db
            .get_conversation(&conversation_id)
            .map_err(|e| format!("Failed to load conversation: {e}"))?;
        if !conversation.involves(&session.user_id) {
            return Err("Not a participant of this conversation".to_string());
        }

        db.create_message(NewMessage {
            conversation_id,
            sender_id: session.user_id,
            sender_name: session.display_name,
            content,
        })
        .map_err(|e| format!("Failed to store message: {e}"))
    });

    if let Ok(msg) = &result {
        info!(msg_id = %msg.id, conversation = %msg.conversation_id, "Message sent");
    }
    result.into()
}

pub fn edit_message(state: &SharedState, message_id: String, content: String) -> CommandResult<Message> {
    let result = own_message(state, &message_id).and_then(|db| {
        db.update_message(
            &message_id,
            MessagePatch {
                content: Some(content),
            },
        )
        .map_err(|e| format!("Failed to edit message: {e}"))
    });
    result.into()
}

pub fn delete_message(state: &SharedState, message_id: String) -> CommandResult<Message> {
    let result = own_message(state, &message_id).and_then(|db| {
        db.delete_message(&message_id)
            .map_err(|e| format!("Failed to delete message: {e}"))
    });
    result.into()
}

fn own_message(state: &SharedState, message_id: &str) -> Result<gigboard_store::Database, String> {
    let (db, session) = database_and_session(state)?;
    let message = db
        .get_message(message_id)
        .map_err(|e| format!("Failed to load message: {e}"))?;
    if message.sender_id != session.user_id {
        return Err("Not your message".to_string());
    }
    Ok(db)
}
