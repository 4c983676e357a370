use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::budget::{Budget, BudgetPeriod};
use crate::errors::{FinanceError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateEntry {
    pub category: String,
    pub limit: Decimal,
    #[serde(default)]
    pub period: BudgetPeriod,
}

/// A named set of budget limits that can be stamped into the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetTemplate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub entries: Vec<TemplateEntry>,
}

impl BudgetTemplate {
    pub fn new(user_id: Uuid, name: impl Into<String>, entries: Vec<TemplateEntry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            description: None,
            entries,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FinanceError::invalid("template name is required"));
        }
        self.to_budgets().iter().try_for_each(Budget::validate)
    }

    /// Fresh budgets (new ids) for every entry.
    pub fn to_budgets(&self) -> Vec<Budget> {
        self.entries
            .iter()
            .map(|entry| Budget::new(entry.category.clone(), entry.limit, entry.period))
            .collect()
    }
}
