//! CRUD operations for [`Transaction`] records, plus gig completion.

use gigboard_shared::{
    ids, ApplicationStatus, GigStatus, IdPrefix, NotificationKind, Role, TransactionStatus,
};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Application, Gig, NewTransaction, Transaction, TransactionPatch};

impl Database {
    pub fn create_transaction(&self, new: NewTransaction) -> Result<Transaction> {
        let transaction = Transaction {
            id: ids::generate(IdPrefix::Transaction),
            gig_id: new.gig_id,
            from_user_id: new.from_user_id,
            to_user_id: new.to_user_id,
            amount: new.amount,
            payment_method: new.payment_method,
            status: new.status.unwrap_or_default(),
            created_at: self.now(),
            updated_at: None,
        };

        let transaction = self.insert_record(transaction)?;
        self.notify_changed();
        Ok(transaction)
    }

    pub fn list_transactions(&self) -> Vec<Transaction> {
        self.list()
    }

    pub fn get_transaction(&self, id: &str) -> Result<Transaction> {
        self.find(id)
    }

    pub fn update_transaction(&self, id: &str, patch: TransactionPatch) -> Result<Transaction> {
        let transaction = self.update_record(id, patch)?;
        self.notify_changed();
        Ok(transaction)
    }

    pub fn delete_transaction(&self, id: &str) -> Result<Transaction> {
        let transaction = self.remove_record(id)?;
        self.notify_changed();
        Ok(transaction)
    }

    /// Platform fee for `amount` at the configured rate, rounded to cents.
    pub fn platform_fee_for(&self, amount: f64) -> f64 {
        (amount * self.fee_rate() * 100.0).round() / 100.0
    }

    /// Pay the hired student for a gig and close it out.
    ///
    /// Records a completed transaction from the gig owner to the hired
    /// student for the full pay, marks the gig completed with `paidAmount`
    /// and `platformFee`, and marks the hired application completed.
    pub fn complete_gig(&self, gig_id: &str, payment_method: &str) -> Result<Transaction> {
        let gig: Gig = self.find(gig_id)?;

        if gig.status == GigStatus::Completed {
            return Err(StoreError::Invalid(format!("gig {gig_id} is already completed")));
        }

        let hired = self
            .list::<Application>()
            .into_iter()
            .find(|a| a.gig_id == gig_id && a.status == ApplicationStatus::Hired)
            .ok_or_else(|| StoreError::Invalid(format!("gig {gig_id} has no hired applicant")))?;

        let fee = self.platform_fee_for(gig.pay);
        let transaction = self.insert_record(Transaction {
            id: ids::generate(IdPrefix::Transaction),
            gig_id: gig.id.clone(),
            from_user_id: gig.owner_id.clone(),
            to_user_id: hired.user_id.clone(),
            amount: gig.pay,
            payment_method: payment_method.to_string(),
            status: TransactionStatus::Completed,
            created_at: self.now(),
            updated_at: None,
        })?;

        let closed_out = self
            .modify_record(gig_id, |g: &mut Gig| {
                g.status = GigStatus::Completed;
                g.paid_amount = Some(g.pay);
                g.platform_fee = Some(fee);
            })
            .and_then(|_| {
                self.modify_record(&hired.id, |a: &mut Application| {
                    a.status = ApplicationStatus::Completed;
                })
            });
        if let Err(e) = closed_out {
            tracing::warn!(
                gig = gig_id,
                transaction = %transaction.id,
                error = %e,
                "gig completion stopped partway"
            );
            self.notify_changed();
            return Err(e);
        }

        tracing::info!(gig = gig_id, amount = gig.pay, fee, "gig completed");
        self.notify_best_effort(
            Role::Student,
            "Payment received",
            &format!("You were paid {:.2} for \"{}\"", gig.pay, gig.title),
            NotificationKind::Success,
        );
        self.notify_changed();

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::FailingKey;
    use crate::backend::KeyValueBackend;
    use crate::models::NewGig;
    use std::sync::Arc;

    fn hired_gig(db: &Database, pay: f64) -> (Gig, Application) {
        let gig = db
            .create_gig(NewGig {
                title: "Build a site".into(),
                pay,
                owner_id: "c1".into(),
                ..Default::default()
            })
            .unwrap();
        let application = db.apply_to_gig(&gig.id, "s1", "hire me").unwrap();
        db.hire_applicant(&application.id).unwrap();
        (gig, application)
    }

    #[test]
    fn create_defaults_to_pending() {
        let db = Database::in_memory();
        let txn = db
            .create_transaction(NewTransaction {
                gig_id: "gig_1".into(),
                from_user_id: "c1".into(),
                to_user_id: "s1".into(),
                amount: 50.0,
                payment_method: "card".into(),
                status: None,
            })
            .unwrap();

        assert!(txn.id.starts_with("txn_"));
        assert_eq!(txn.status, TransactionStatus::Pending);
        assert!(txn.updated_at.is_none());

        let updated = db
            .update_transaction(
                &txn.id,
                TransactionPatch {
                    status: Some(TransactionStatus::Completed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, TransactionStatus::Completed);
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn completing_records_payment_and_fee() {
        let db = Database::in_memory();
        let (gig, application) = hired_gig(&db, 500.0);

        let txn = db.complete_gig(&gig.id, "upi").unwrap();

        assert_eq!(txn.amount, 500.0);
        assert_eq!(txn.from_user_id, "c1");
        assert_eq!(txn.to_user_id, "s1");
        assert_eq!(txn.status, TransactionStatus::Completed);

        let gig = db.get_gig(&gig.id).unwrap();
        assert_eq!(gig.status, GigStatus::Completed);
        assert_eq!(gig.paid_amount, Some(500.0));
        assert_eq!(gig.platform_fee, Some(50.0));

        let application = db.get_application(&application.id).unwrap();
        assert_eq!(application.status, ApplicationStatus::Completed);
    }

    #[test]
    fn completing_twice_is_refused() {
        let db = Database::in_memory();
        let (gig, _) = hired_gig(&db, 100.0);

        db.complete_gig(&gig.id, "card").unwrap();
        assert!(matches!(
            db.complete_gig(&gig.id, "card"),
            Err(StoreError::Invalid(_))
        ));
        assert_eq!(db.list_transactions().len(), 1);
    }

    #[test]
    fn completing_without_hire_is_refused() {
        let db = Database::in_memory();
        let gig = db
            .create_gig(NewGig {
                title: "Nobody hired".into(),
                pay: 10.0,
                owner_id: "c1".into(),
                ..Default::default()
            })
            .unwrap();

        assert!(matches!(
            db.complete_gig(&gig.id, "card"),
            Err(StoreError::Invalid(_))
        ));
        assert!(db.list_transactions().is_empty());
    }

    #[test]
    fn partial_completion_keeps_payment_and_signals() {
        let backend = Arc::new(FailingKey::default());
        let db = Database::new(Arc::clone(&backend) as Arc<dyn KeyValueBackend>);
        let (gig, application) = hired_gig(&db, 40.0);
        backend.fail_writes_to("applications");
        let before = db.bus().generation();

        let err = db.complete_gig(&gig.id, "card").unwrap_err();

        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(db.bus().generation(), before + 1);
        assert_eq!(db.list_transactions().len(), 1);
        assert_eq!(db.get_gig(&gig.id).unwrap().status, GigStatus::Completed);
        assert_eq!(
            db.get_application(&application.id).unwrap().status,
            ApplicationStatus::Hired
        );
    }

    #[test]
    fn completion_signals_once() {
        let db = Database::in_memory();
        let (gig, _) = hired_gig(&db, 40.0);
        let before = db.bus().generation();

        db.complete_gig(&gig.id, "card").unwrap();

        assert_eq!(db.bus().generation(), before + 1);
    }

    #[test]
    fn fee_respects_configured_rate() {
        let db = Database::in_memory().with_fee_rate(0.125);
        assert_eq!(db.platform_fee_for(99.99), 12.5);
    }
}
