//! Derived, read-only views over the raw collections.
//!
//! The free functions filter slices and are pure; the [`Database`] methods
//! re-read the full collection on every call and apply them. Nothing is
//! cached and nothing is re-sorted: results keep stored order.

use std::collections::HashSet;

use gigboard_shared::{GigStatus, TransactionStatus};

use crate::database::Database;
use crate::models::{Application, Conversation, Gig, Message, Transaction};

/// Gigs still visible to applicants: anything not closed or hired.
pub fn open_gigs(gigs: &[Gig]) -> Vec<Gig> {
    gigs.iter()
        .filter(|g| !matches!(g.status, GigStatus::Closed | GigStatus::Hired))
        .cloned()
        .collect()
}

pub fn gigs_by_owner(gigs: &[Gig], owner_id: &str) -> Vec<Gig> {
    gigs.iter().filter(|g| g.owner_id == owner_id).cloned().collect()
}

pub fn applications_by_user(applications: &[Application], user_id: &str) -> Vec<Application> {
    applications
        .iter()
        .filter(|a| a.user_id == user_id)
        .cloned()
        .collect()
}

pub fn applications_by_gig(applications: &[Application], gig_id: &str) -> Vec<Application> {
    applications
        .iter()
        .filter(|a| a.gig_id == gig_id)
        .cloned()
        .collect()
}

/// Applications to any gig owned by `client_id`.
pub fn applications_for_client(
    gigs: &[Gig],
    applications: &[Application],
    client_id: &str,
) -> Vec<Application> {
    let owned: HashSet<&str> = gigs
        .iter()
        .filter(|g| g.owner_id == client_id)
        .map(|g| g.id.as_str())
        .collect();

    applications
        .iter()
        .filter(|a| owned.contains(a.gig_id.as_str()))
        .cloned()
        .collect()
}

/// Transactions where `user_id` is payer or payee.
pub fn transactions_for_user(transactions: &[Transaction], user_id: &str) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.from_user_id == user_id || t.to_user_id == user_id)
        .cloned()
        .collect()
}

pub fn conversations_for_user(conversations: &[Conversation], user_id: &str) -> Vec<Conversation> {
    conversations
        .iter()
        .filter(|c| c.involves(user_id))
        .cloned()
        .collect()
}

pub fn messages_in_conversation(messages: &[Message], conversation_id: &str) -> Vec<Message> {
    messages
        .iter()
        .filter(|m| m.conversation_id == conversation_id)
        .cloned()
        .collect()
}

/// Sum of recorded platform fees.
pub fn platform_revenue(gigs: &[Gig]) -> f64 {
    gigs.iter().filter_map(|g| g.platform_fee).sum()
}

/// Sum of completed payments received by `user_id`.
pub fn earnings_for_user(transactions: &[Transaction], user_id: &str) -> f64 {
    transactions
        .iter()
        .filter(|t| t.to_user_id == user_id && t.status == TransactionStatus::Completed)
        .map(|t| t.amount)
        .sum()
}

impl Database {
    pub fn open_gigs(&self) -> Vec<Gig> {
        open_gigs(&self.list_gigs())
    }

    pub fn gigs_by_owner(&self, owner_id: &str) -> Vec<Gig> {
        gigs_by_owner(&self.list_gigs(), owner_id)
    }

    pub fn applications_by_user(&self, user_id: &str) -> Vec<Application> {
        applications_by_user(&self.list_applications(), user_id)
    }

    pub fn applications_by_gig(&self, gig_id: &str) -> Vec<Application> {
        applications_by_gig(&self.list_applications(), gig_id)
    }

    pub fn applications_for_client(&self, client_id: &str) -> Vec<Application> {
        applications_for_client(&self.list_gigs(), &self.list_applications(), client_id)
    }

    pub fn transactions_for_user(&self, user_id: &str) -> Vec<Transaction> {
        transactions_for_user(&self.list_transactions(), user_id)
    }

    pub fn conversations_for_user(&self, user_id: &str) -> Vec<Conversation> {
        conversations_for_user(&self.list_conversations(), user_id)
    }

    pub fn messages_in_conversation(&self, conversation_id: &str) -> Vec<Message> {
        messages_in_conversation(&self.list_messages(), conversation_id)
    }

    pub fn platform_revenue(&self) -> f64 {
        platform_revenue(&self.list_gigs())
    }

    pub fn earnings_for_user(&self, user_id: &str) -> f64 {
        earnings_for_user(&self.list_transactions(), user_id)
    }
}
