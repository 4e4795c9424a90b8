//! CRUD operations for [`Gig`] records.
//!
//! Deleting a gig cascades to its applications, conversations and messages;
//! that lives in [`crate::cascade`].

use chrono::{DateTime, Utc};
use gigboard_shared::{ids, GigStatus, IdPrefix};

use crate::cascade::CascadeReport;
use crate::database::Database;
use crate::error::Result;
use crate::models::{Gig, GigPatch, NewGig};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new gig with a generated id and `createdAt`.
    pub fn create_gig(&self, new: NewGig) -> Result<Gig> {
        let gig = Gig {
            id: ids::generate(IdPrefix::Gig),
            title: new.title,
            category: new.category,
            location: new.location,
            duration: new.duration,
            pay: new.pay,
            short_desc: new.short_desc,
            full_desc: new.full_desc,
            requirements: new.requirements,
            owner_id: new.owner_id,
            status: new.status.unwrap_or_default(),
            created_at: self.now(),
            updated_at: None,
            scheduled_removal_at: new.scheduled_removal_at,
            moderation_note: None,
            paid_amount: None,
            platform_fee: None,
        };

        let gig = self.insert_record(gig)?;
        self.notify_changed();
        Ok(gig)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn list_gigs(&self) -> Vec<Gig> {
        self.list()
    }

    pub fn get_gig(&self, id: &str) -> Result<Gig> {
        self.find(id)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Shallow-merge `patch` over the stored gig.
    pub fn update_gig(&self, id: &str, patch: GigPatch) -> Result<Gig> {
        let gig = self.update_record(id, patch)?;
        self.notify_changed();
        Ok(gig)
    }

    /// Any status may be written; transitions are not checked.
    pub fn set_gig_status(&self, id: &str, status: GigStatus) -> Result<Gig> {
        self.update_gig(
            id,
            GigPatch {
                status: Some(status),
                ..Default::default()
            },
        )
    }

    // ------------------------------------------------------------------
    // Scheduled removal
    // ------------------------------------------------------------------

    /// Mark a gig for deletion at `at`, optionally recording why.
    pub fn schedule_gig_removal(
        &self,
        id: &str,
        at: DateTime<Utc>,
        moderation_note: Option<String>,
    ) -> Result<Gig> {
        let gig = self.modify_record(id, |gig: &mut Gig| {
            gig.scheduled_removal_at = Some(at);
            if moderation_note.is_some() {
                gig.moderation_note = moderation_note;
            }
        })?;

        tracing::info!(gig = id, at = %at, "gig scheduled for removal");
        self.notify_changed();
        Ok(gig)
    }

    pub fn cancel_gig_removal(&self, id: &str) -> Result<Gig> {
        let gig = self.modify_record(id, |gig: &mut Gig| {
            gig.scheduled_removal_at = None;
        })?;
        self.notify_changed();
        Ok(gig)
    }

    /// Gigs whose scheduled removal time is at or before `now`.
    pub fn gigs_due_for_removal(&self, now: DateTime<Utc>) -> Vec<Gig> {
        self.list_gigs()
            .into_iter()
            .filter(|g| g.scheduled_removal_at.is_some_and(|at| at <= now))
            .collect()
    }

    /// Delete every gig that is due. A failing gig is logged and skipped so
    /// one bad record does not block the rest.
    pub fn purge_scheduled_removals(&self, now: DateTime<Utc>) -> Vec<CascadeReport> {
        let mut reports = Vec::new();
        for gig in self.gigs_due_for_removal(now) {
            match self.delete_gig(&gig.id) {
                Ok(report) => reports.push(report),
                Err(e) => tracing::error!(gig = %gig.id, error = %e, "scheduled removal failed"),
            }
        }
        reports
    }
}
