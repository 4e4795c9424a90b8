use gigboard_store::Transaction;
use serde::Serialize;
use tracing::info;

use crate::commands::{database, database_and_session, CommandResult};
use crate::state::SharedState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsDto {
    pub user_id: String,
    pub total: f64,
    pub transactions: Vec<Transaction>,
}

/// Pay the hired student and close out the gig.
pub fn complete_gig(
    state: &SharedState,
    gig_id: String,
    payment_method: String,
) -> CommandResult<Transaction> {
    let result = database(state).and_then(|db| {
        db.complete_gig(&gig_id, &payment_method)
            .map_err(|e| format!("Failed to complete gig: {e}"))
    });

    if let Ok(txn) = &result {
        info!(gig = %txn.gig_id, amount = txn.amount, "Gig completed");
    }
    result.into()
}

pub fn my_transactions(state: &SharedState) -> CommandResult<Vec<Transaction>> {
    database_and_session(state)
        .map(|(db, session)| db.transactions_for_user(&session.user_id))
        .into()
}

pub fn my_earnings(state: &SharedState) -> CommandResult<EarningsDto> {
    database_and_session(state)
        .map(|(db, session)| EarningsDto {
            total: db.earnings_for_user(&session.user_id),
            transactions: db.transactions_for_user(&session.user_id),
            user_id: session.user_id,
        })
        .into()
}

pub fn platform_revenue(state: &SharedState) -> CommandResult<f64> {
    database(state).map(|db| db.platform_revenue()).into()
}
