//! Business logic helpers for managing transactions.

use uuid::Uuid;

use crate::errors::{FinanceError, Result};
use crate::ledger::{ledger::take_where, Ledger, Transaction, TransactionPatch};

/// Provides validated CRUD helpers for ledger transactions.
pub struct TransactionService;

impl TransactionService {
    /// Stores a transaction under a freshly assigned identifier and returns it.
    pub fn add(ledger: &mut Ledger, mut transaction: Transaction) -> Result<Uuid> {
        transaction.id = Uuid::new_v4();
        transaction.validate()?;
        let id = transaction.id;
        ledger.transactions.push(transaction);
        tracing::debug!(%id, "transaction added");
        Ok(id)
    }

    /// Applies `patch` to the transaction identified by `id`. The merged record
    /// must still validate, otherwise the ledger is left untouched.
    pub fn update(ledger: &mut Ledger, id: Uuid, patch: TransactionPatch) -> Result<()> {
        let txn = ledger
            .transaction_mut(id)
            .ok_or_else(|| FinanceError::not_found("transaction", id))?;
        let mut updated = txn.clone();
        updated.apply(patch);
        updated.validate()?;
        *txn = updated;
        Ok(())
    }

    /// Removes the transaction identified by `id`, returning the removed instance.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<Transaction> {
        let removed = take_where(&mut ledger.transactions, |txn| txn.id == id)
            .ok_or_else(|| FinanceError::not_found("transaction", id))?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn sample_transaction() -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Transaction::expense(Decimal::from(42), "food", date)
    }

    #[test]
    fn add_rejects_non_positive_amounts() {
        let mut ledger = Ledger::new();
        let mut txn = sample_transaction();
        txn.amount = Decimal::ZERO;
        let err = TransactionService::add(&mut ledger, txn).expect_err("zero amount");
        assert!(matches!(err, FinanceError::Validation(_)), "unexpected error: {err:?}");
        assert!(ledger.transactions.is_empty());
    }

    #[test]
    fn update_fails_for_missing_transaction() {
        let mut ledger = Ledger::new();
        let err = TransactionService::update(&mut ledger, Uuid::new_v4(), TransactionPatch::default())
            .expect_err("update must fail for unknown id");
        assert!(
            matches!(err, FinanceError::NotFound { entity: "transaction", .. }),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn update_keeps_identity_and_rejects_invalid_patch() {
        let mut ledger = Ledger::new();
        let id = TransactionService::add(&mut ledger, sample_transaction()).unwrap();

        TransactionService::update(
            &mut ledger,
            id,
            TransactionPatch {
                amount: Some(Decimal::from(50)),
                description: Some("Lunch".into()),
                ..TransactionPatch::default()
            },
        )
        .unwrap();
        let stored = ledger.transaction(id).unwrap();
        assert_eq!(stored.amount, Decimal::from(50));
        assert_eq!(stored.description, "Lunch");

        let err = TransactionService::update(
            &mut ledger,
            id,
            TransactionPatch {
                category: Some("   ".into()),
                ..TransactionPatch::default()
            },
        )
        .expect_err("blank category");
        assert!(matches!(err, FinanceError::Validation(_)));
        assert_eq!(ledger.transaction(id).unwrap().category, "food");
    }

    #[test]
    fn add_assigns_a_fresh_id_per_call() {
        let mut ledger = Ledger::new();
        let txn = sample_transaction();
        let first = TransactionService::add(&mut ledger, txn.clone()).unwrap();
        let second = TransactionService::add(&mut ledger, txn.clone()).unwrap();
        assert_ne!(first, second);
        assert_ne!(first, txn.id);

        TransactionService::remove(&mut ledger, first).unwrap();
        assert!(ledger.transaction(first).is_none());
        assert!(ledger.transaction(second).is_some());
    }

    #[test]
    fn remove_returns_deleted_transaction() {
        let mut ledger = Ledger::new();
        let txn_id = TransactionService::add(&mut ledger, sample_transaction()).unwrap();

        let removed = TransactionService::remove(&mut ledger, txn_id).unwrap();
        assert_eq!(removed.id, txn_id);
        assert!(ledger.transaction(txn_id).is_none());
    }
}
