//! Records persisted in the key-value backend, plus the inputs used to create
//! them and the patches used to update them.
//!
//! Every record serializes with camelCase field names, which is the JSON shape
//! stored under each collection key.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gigboard_shared::{ApplicationStatus, GigStatus, NotificationKind, TransactionStatus};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Gig
// ---------------------------------------------------------------------------

/// A job posted by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Gig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub duration: String,
    pub pay: f64,
    #[serde(default)]
    pub short_desc: String,
    #[serde(default)]
    pub full_desc: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    /// User id of the posting client.
    pub owner_id: String,
    #[serde(default)]
    pub status: GigStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// When set, the gig is deleted once this moment has passed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_removal_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_fee: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewGig {
    pub title: String,
    pub category: String,
    pub location: String,
    pub duration: String,
    pub pay: f64,
    pub short_desc: String,
    pub full_desc: String,
    pub requirements: Vec<String>,
    pub owner_id: String,
    /// Defaults to `open`.
    pub status: Option<GigStatus>,
    pub scheduled_removal_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GigPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub duration: Option<String>,
    pub pay: Option<f64>,
    pub short_desc: Option<String>,
    pub full_desc: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub status: Option<GigStatus>,
    pub scheduled_removal_at: Option<DateTime<Utc>>,
    pub moderation_note: Option<String>,
    pub paid_amount: Option<f64>,
    pub platform_fee: Option<f64>,
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// A student's proposal for a gig.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub gig_id: String,
    pub user_id: String,
    #[serde(default)]
    pub proposal: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewApplication {
    pub gig_id: String,
    pub user_id: String,
    pub proposal: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationPatch {
    pub proposal: Option<String>,
    pub status: Option<ApplicationStatus>,
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A payment from a client to a student.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub gig_id: String,
    /// Payer.
    pub from_user_id: String,
    /// Payee.
    pub to_user_id: String,
    pub amount: f64,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTransaction {
    pub gig_id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub amount: f64,
    pub payment_method: String,
    /// Defaults to `pending`.
    pub status: Option<TransactionStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionPatch {
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    pub status: Option<TransactionStatus>,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A two-party chat attached to a gig.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub participants: [String; 2],
    #[serde(default)]
    pub participant_names: BTreeMap<String, String>,
    pub gig_id: String,
    #[serde(default)]
    pub gig_title: String,
    /// Content of the latest message, kept in sync when a message is created.
    #[serde(default)]
    pub last_message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn involves(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// Whether this conversation is between `a` and `b`, in either order.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        let [first, second] = &self.participants;
        (first == a && second == b) || (first == b && second == a)
    }

    /// The participant that is not `user_id`.
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        let [first, second] = &self.participants;
        if first == user_id {
            Some(second)
        } else if second == user_id {
            Some(first)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewConversation {
    pub participants: [String; 2],
    pub participant_names: BTreeMap<String, String>,
    pub gig_id: String,
    pub gig_title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationPatch {
    pub participant_names: Option<BTreeMap<String, String>>,
    pub gig_title: Option<String>,
    pub last_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewMessage {
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MessagePatch {
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// An entry in a role's notification feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    pub is_unread: bool,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gig_uses_camel_case_keys() {
        let gig = Gig {
            id: "gig_1".into(),
            title: "Tutor".into(),
            category: "Education".into(),
            location: "Remote".into(),
            duration: "2 weeks".into(),
            pay: 500.0,
            short_desc: "short".into(),
            full_desc: "full".into(),
            requirements: vec!["Patience".into()],
            owner_id: "c1".into(),
            status: GigStatus::Open,
            created_at: Utc::now(),
            updated_at: None,
            scheduled_removal_at: None,
            moderation_note: None,
            paid_amount: None,
            platform_fee: None,
        };

        let value = serde_json::to_value(&gig).unwrap();
        assert_eq!(value["ownerId"], "c1");
        assert_eq!(value["shortDesc"], "short");
        assert_eq!(value["status"], "open");
        assert!(value.get("paidAmount").is_none());
    }

    #[test]
    fn notification_kind_is_stored_as_type() {
        let json = r#"{"id":"notif_1","title":"t","message":"m","type":"warning","isUnread":true,"timestamp":"2024-01-01T00:00:00Z"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind, NotificationKind::Warning);
        assert!(n.is_unread);
    }

    #[test]
    fn conversation_pair_is_unordered() {
        let now = Utc::now();
        let conv = Conversation {
            id: "conv_1".into(),
            participants: ["c1".into(), "s1".into()],
            participant_names: BTreeMap::new(),
            gig_id: "gig_1".into(),
            gig_title: String::new(),
            last_message: String::new(),
            created_at: now,
            updated_at: now,
        };

        assert!(conv.is_between("s1", "c1"));
        assert!(!conv.is_between("s1", "s2"));
        assert_eq!(conv.counterpart("c1"), Some("s1"));
        assert_eq!(conv.counterpart("x"), None);
    }
}
