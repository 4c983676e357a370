//! Aggregate getters. Every call walks the transaction list; nothing is cached.

use rust_decimal::Decimal;

use crate::ledger::{
    category::normalize_category, DateWindow, Ledger, Transaction, TransactionKind,
};

pub struct SummaryService;

impl SummaryService {
    pub fn total_income(ledger: &Ledger) -> Decimal {
        sum_kind(ledger.transactions.iter(), TransactionKind::Income)
    }

    pub fn total_expenses(ledger: &Ledger) -> Decimal {
        sum_kind(ledger.transactions.iter(), TransactionKind::Expense)
    }

    pub fn balance(ledger: &Ledger) -> Decimal {
        Self::total_income(ledger) - Self::total_expenses(ledger)
    }

    /// Expense total for `category`, comparing normalized keys on both sides.
    pub fn category_spending(ledger: &Ledger, category: &str) -> Decimal {
        let wanted = normalize_category(category);
        ledger
            .transactions
            .iter()
            .filter(|txn| txn.is_expense() && normalize_category(&txn.category) == wanted)
            .map(|txn| txn.amount)
            .sum()
    }

    /// Income and expense totals for transactions inside `window`.
    pub fn window_totals(ledger: &Ledger, window: DateWindow) -> (Decimal, Decimal) {
        let in_window = || ledger.transactions.iter().filter(|txn| window.contains(txn.date));
        (
            sum_kind(in_window(), TransactionKind::Income),
            sum_kind(in_window(), TransactionKind::Expense),
        )
    }
}

fn sum_kind<'a>(
    transactions: impl Iterator<Item = &'a Transaction>,
    kind: TransactionKind,
) -> Decimal {
    transactions
        .filter(|txn| txn.kind == kind)
        .map(|txn| txn.amount)
        .sum()
}
