use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FinanceError, Result};

/// A spending guardrail for a specific category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub category: String,
    pub limit: Decimal,
    pub period: BudgetPeriod,
}

impl Budget {
    pub fn new(category: impl Into<String>, limit: Decimal, period: BudgetPeriod) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            limit,
            period,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit <= Decimal::ZERO {
            return Err(FinanceError::invalid(format!(
                "budget limit must be positive, got {}",
                self.limit
            )));
        }
        if self.category.trim().is_empty() {
            return Err(FinanceError::invalid("budget category is required"));
        }
        Ok(())
    }

    pub fn apply(&mut self, patch: BudgetPatch) {
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(limit) = patch.limit {
            self.limit = limit;
        }
        if let Some(period) = patch.period {
            self.period = period;
        }
    }
}

/// Enumeration of budgeting periods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetPatch {
    pub category: Option<String>,
    pub limit: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
}
