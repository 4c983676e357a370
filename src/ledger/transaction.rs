use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FinanceError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// A single income or expense entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        category: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            category: category.into(),
            date,
            description: description.into(),
        }
    }

    pub fn income(amount: Decimal, category: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(TransactionKind::Income, amount, category, date, "")
    }

    pub fn expense(amount: Decimal, category: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(TransactionKind::Expense, amount, category, date, "")
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(FinanceError::invalid(format!(
                "transaction amount must be positive, got {}",
                self.amount
            )));
        }
        if self.category.trim().is_empty() {
            return Err(FinanceError::invalid("transaction category is required"));
        }
        Ok(())
    }

    pub fn apply(&mut self, patch: TransactionPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}

/// Partial update for the mutable fields of a [`Transaction`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}
