//! Per-role notification feeds.
//!
//! Each role has its own collection under `notifications_<role>`, newest
//! entry first.

use gigboard_shared::{ids, IdPrefix, NotificationKind, Role};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Notification;

impl Database {
    /// Push a notification to the front of `role`'s feed.
    pub fn notify(
        &self,
        role: Role,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification> {
        let notification = self.push_notification(role, title, message, kind)?;
        self.notify_changed();
        Ok(notification)
    }

    /// Like [`Database::notify`], but a failure is only logged and no change
    /// signal fires. Used for side notifications of an operation that signals
    /// on its own.
    pub(crate) fn notify_best_effort(
        &self,
        role: Role,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) {
        if let Err(e) = self.push_notification(role, title, message, kind) {
            tracing::warn!(%role, error = %e, "notification dropped");
        }
    }

    fn push_notification(
        &self,
        role: Role,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification> {
        let notification = Notification {
            id: ids::generate(IdPrefix::Notification),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            is_unread: true,
            timestamp: self.now(),
        };

        let key = role.notifications_key();
        let mut feed = self.load_collection::<Notification>(&key)?;
        feed.push_front(notification.clone());
        self.save_collection(&key, &feed)?;

        tracing::debug!(%role, id = %notification.id, "notification added");
        Ok(notification)
    }

    pub fn list_notifications(&self, role: Role) -> Vec<Notification> {
        self.read_collection(&role.notifications_key())
    }

    pub fn unread_count(&self, role: Role) -> usize {
        self.list_notifications(role)
            .iter()
            .filter(|n| n.is_unread)
            .count()
    }

    /// Mark one notification read. Marking an already-read entry is a no-op
    /// that writes nothing.
    pub fn mark_read(&self, role: Role, id: &str) -> Result<Notification> {
        let key = role.notifications_key();
        let mut feed = self.load_collection::<Notification>(&key)?;
        let entry = feed
            .records_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| StoreError::not_found("Notification", id))?;

        if !entry.is_unread {
            return Ok(entry.clone());
        }

        entry.is_unread = false;
        let updated = entry.clone();
        self.save_collection(&key, &feed)?;
        self.notify_changed();
        Ok(updated)
    }

    /// Returns how many entries changed.
    pub fn mark_all_read(&self, role: Role) -> Result<usize> {
        let key = role.notifications_key();
        let mut feed = self.load_collection::<Notification>(&key)?;
        let mut changed = 0;
        for entry in feed.records_mut().filter(|n| n.is_unread) {
            entry.is_unread = false;
            changed += 1;
        }

        if changed > 0 {
            self.save_collection(&key, &feed)?;
            self.notify_changed();
        }
        Ok(changed)
    }

    pub fn clear_notifications(&self, role: Role) -> Result<()> {
        self.write_collection::<Notification>(&role.notifications_key(), &[])
    }
}
