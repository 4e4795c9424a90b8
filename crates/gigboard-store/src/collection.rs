//! Typed collection identifiers.
//!
//! Each [`Collection`] names one storage key and is bound to exactly one
//! record type through [`Record::COLLECTION`], so the key a record family is
//! read from and written to is fixed at compile time.

use chrono::{DateTime, Utc};
use gigboard_shared::constants::{
    KEY_APPLICATIONS, KEY_CONVERSATIONS, KEY_GIGS, KEY_MESSAGES, KEY_TRANSACTIONS,
};
use gigboard_shared::IdPrefix;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapter::Loaded;
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{
    Application, ApplicationPatch, Conversation, ConversationPatch, Gig, GigPatch, Message,
    MessagePatch, Transaction, TransactionPatch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Gigs,
    Applications,
    Transactions,
    Conversations,
    Messages,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Gigs,
        Collection::Applications,
        Collection::Transactions,
        Collection::Conversations,
        Collection::Messages,
    ];

    /// Storage key. These strings are the persisted layout and never change.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Gigs => KEY_GIGS,
            Self::Applications => KEY_APPLICATIONS,
            Self::Transactions => KEY_TRANSACTIONS,
            Self::Conversations => KEY_CONVERSATIONS,
            Self::Messages => KEY_MESSAGES,
        }
    }

    /// Singular name used in errors and logs.
    pub fn record_name(&self) -> &'static str {
        match self {
            Self::Gigs => "Gig",
            Self::Applications => "Application",
            Self::Transactions => "Transaction",
            Self::Conversations => "Conversation",
            Self::Messages => "Message",
        }
    }

    pub fn id_prefix(&self) -> IdPrefix {
        match self {
            Self::Gigs => IdPrefix::Gig,
            Self::Applications => IdPrefix::Application,
            Self::Transactions => IdPrefix::Transaction,
            Self::Conversations => IdPrefix::Conversation,
            Self::Messages => IdPrefix::Message,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A record stored in one of the entity collections.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    /// Stamp the record's `updatedAt`.
    fn touch(&mut self, now: DateTime<Utc>);
}

/// A partial update. `Some` fields overwrite the record, `None` fields are
/// left alone.
pub trait Patch<T> {
    fn apply_to(self, target: &mut T);
}

macro_rules! overwrite {
    ($target:ident, $patch:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )+
    };
}

impl Record for Gig {
    const COLLECTION: Collection = Collection::Gigs;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

impl Patch<Gig> for GigPatch {
    fn apply_to(self, gig: &mut Gig) {
        let patch = self;
        overwrite!(
            gig,
            patch,
            title,
            category,
            location,
            duration,
            pay,
            short_desc,
            full_desc,
            requirements,
            status,
        );
        if patch.scheduled_removal_at.is_some() {
            gig.scheduled_removal_at = patch.scheduled_removal_at;
        }
        if patch.moderation_note.is_some() {
            gig.moderation_note = patch.moderation_note;
        }
        if patch.paid_amount.is_some() {
            gig.paid_amount = patch.paid_amount;
        }
        if patch.platform_fee.is_some() {
            gig.platform_fee = patch.platform_fee;
        }
    }
}

impl Record for Application {
    const COLLECTION: Collection = Collection::Applications;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Patch<Application> for ApplicationPatch {
    fn apply_to(self, application: &mut Application) {
        let patch = self;
        overwrite!(application, patch, proposal, status);
    }
}

impl Record for Transaction {
    const COLLECTION: Collection = Collection::Transactions;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

impl Patch<Transaction> for TransactionPatch {
    fn apply_to(self, transaction: &mut Transaction) {
        let patch = self;
        overwrite!(transaction, patch, amount, payment_method, status);
    }
}

impl Record for Conversation {
    const COLLECTION: Collection = Collection::Conversations;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Patch<Conversation> for ConversationPatch {
    fn apply_to(self, conversation: &mut Conversation) {
        let patch = self;
        overwrite!(conversation, patch, participant_names, gig_title, last_message);
    }
}

impl Record for Message {
    const COLLECTION: Collection = Collection::Messages;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

impl Patch<Message> for MessagePatch {
    fn apply_to(self, message: &mut Message) {
        let patch = self;
        overwrite!(message, patch, content);
    }
}

// ---------------------------------------------------------------------------
// Generic accessors
// ---------------------------------------------------------------------------
//
// None of these fire the change signal. The public per-family methods decide
// when a mutation is complete and notify once.

impl Database {
    /// Full collection in stored order. Missing or corrupt data reads as empty.
    pub fn list<T: Record>(&self) -> Vec<T> {
        self.read_collection(T::COLLECTION.key())
    }

    pub fn find<T: Record>(&self, id: &str) -> Result<T> {
        self.list::<T>()
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(T::COLLECTION.record_name(), id))
    }

    /// Load a collection for modification. Malformed elements are carried
    /// along so [`Database::save_records`] writes them back untouched.
    pub(crate) fn load_records<T: Record>(&self) -> Result<Loaded<T>> {
        self.load_collection(T::COLLECTION.key())
    }

    pub(crate) fn save_records<T: Record>(&self, records: &Loaded<T>) -> Result<()> {
        self.save_collection(T::COLLECTION.key(), records)
    }

    pub(crate) fn insert_record<T: Record>(&self, record: T) -> Result<T> {
        let mut records = self.load_records::<T>()?;
        records.push(record.clone());
        self.save_records(&records)?;

        tracing::debug!(collection = %T::COLLECTION, id = record.id(), "record created");
        Ok(record)
    }

    pub(crate) fn update_record<T, P>(&self, id: &str, patch: P) -> Result<T>
    where
        T: Record,
        P: Patch<T>,
    {
        self.modify_record(id, |record: &mut T| patch.apply_to(record))
    }

    /// Locate `id`, run `edit` on it, stamp `updatedAt` and persist.
    pub(crate) fn modify_record<T, F>(&self, id: &str, edit: F) -> Result<T>
    where
        T: Record,
        F: FnOnce(&mut T),
    {
        let now = self.now();
        let mut records = self.load_records::<T>()?;
        let record = records
            .records_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(T::COLLECTION.record_name(), id))?;

        edit(record);
        record.touch(now);
        let updated = record.clone();

        self.save_records(&records)?;

        tracing::debug!(collection = %T::COLLECTION, id, "record updated");
        Ok(updated)
    }

    pub(crate) fn remove_record<T: Record>(&self, id: &str) -> Result<T> {
        let mut records = self.load_records::<T>()?;
        let removed = records
            .take_first(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(T::COLLECTION.record_name(), id))?;

        self.save_records(&records)?;

        tracing::debug!(collection = %T::COLLECTION, id, "record deleted");
        Ok(removed)
    }

    /// Drop every record matching `predicate`. Returns the removed records;
    /// nothing is written when none match.
    pub(crate) fn remove_where<T, F>(&self, predicate: F) -> Result<Vec<T>>
    where
        T: Record,
        F: Fn(&T) -> bool,
    {
        let mut records = self.load_records::<T>()?;
        let removed = records.take_where(predicate);
        if !removed.is_empty() {
            self.save_records(&records)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct() {
        let mut keys: Vec<&str> = Collection::ALL.iter().map(Collection::key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Collection::ALL.len());
    }

    #[test]
    fn gig_patch_overwrites_only_given_fields() {
        let db = Database::in_memory();
        let gig = db
            .create_gig(crate::models::NewGig {
                title: "Old".into(),
                pay: 100.0,
                owner_id: "c1".into(),
                ..Default::default()
            })
            .unwrap();

        let patched = db
            .update_record::<Gig, _>(
                &gig.id,
                GigPatch {
                    title: Some("New".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(patched.title, "New");
        assert_eq!(patched.pay, 100.0);
        assert!(patched.updated_at.is_some());
    }
}
