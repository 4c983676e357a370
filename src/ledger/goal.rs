use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FinanceError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Savings,
    DebtPayoff,
    ExpenseLimit,
}

/// A savings, payoff, or spending target tracked by explicit progress updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialGoal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub current_amount: Decimal,
    pub deadline: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub kind: GoalKind,
    pub created_at: DateTime<Utc>,
}

impl FinancialGoal {
    pub fn new(
        user_id: Uuid,
        name: impl Into<String>,
        target_amount: Decimal,
        deadline: NaiveDate,
        kind: GoalKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            target_amount,
            current_amount: Decimal::ZERO,
            deadline,
            category: None,
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FinanceError::invalid("goal name is required"));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(FinanceError::invalid(format!(
                "goal target must be positive, got {}",
                self.target_amount
            )));
        }
        if self.current_amount < Decimal::ZERO {
            return Err(FinanceError::invalid(format!(
                "goal progress cannot be negative, got {}",
                self.current_amount
            )));
        }
        Ok(())
    }

    pub fn is_achieved(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    /// Percentage of the target reached, capped at 100.
    pub fn progress_percent(&self) -> Decimal {
        if self.target_amount.is_zero() {
            return Decimal::ZERO;
        }
        (self.current_amount / self.target_amount * Decimal::ONE_HUNDRED).min(Decimal::ONE_HUNDRED)
    }

    pub fn apply(&mut self, patch: GoalPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(target) = patch.target_amount {
            self.target_amount = target;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
    }
}

/// Partial update for a goal. Progress is changed through a dedicated operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub deadline: Option<NaiveDate>,
    pub category: Option<Option<String>>,
    pub kind: Option<GoalKind>,
}
