use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    alert::Alert, budget::Budget, category::CustomCategory, goal::FinancialGoal,
    recurring::RecurringRule, sharing::SharedBudget, template::BudgetTemplate,
    transaction::Transaction,
};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Every collection owned by the finance engine. Serialized as one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub goals: Vec<FinancialGoal>,
    #[serde(default)]
    pub recurring: Vec<RecurringRule>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub shared_budgets: Vec<SharedBudget>,
    #[serde(default)]
    pub custom_categories: Vec<CustomCategory>,
    #[serde(default)]
    pub budget_templates: Vec<BudgetTemplate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u32,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    /// Empty ledger whose creation and update stamps are `now`.
    pub fn started_at(now: DateTime<Utc>) -> Self {
        Self {
            transactions: Vec::new(),
            budgets: Vec::new(),
            goals: Vec::new(),
            recurring: Vec::new(),
            alerts: Vec::new(),
            shared_budgets: Vec::new(),
            custom_categories: Vec::new(),
            budget_templates: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn budget(&self, id: Uuid) -> Option<&Budget> {
        self.budgets.iter().find(|budget| budget.id == id)
    }

    pub fn budget_mut(&mut self, id: Uuid) -> Option<&mut Budget> {
        self.budgets.iter_mut().find(|budget| budget.id == id)
    }

    pub fn goal(&self, id: Uuid) -> Option<&FinancialGoal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn goal_mut(&mut self, id: Uuid) -> Option<&mut FinancialGoal> {
        self.goals.iter_mut().find(|goal| goal.id == id)
    }

    pub fn recurring_rule(&self, id: Uuid) -> Option<&RecurringRule> {
        self.recurring.iter().find(|rule| rule.id == id)
    }

    pub fn recurring_rule_mut(&mut self, id: Uuid) -> Option<&mut RecurringRule> {
        self.recurring.iter_mut().find(|rule| rule.id == id)
    }

    pub fn alert_mut(&mut self, id: Uuid) -> Option<&mut Alert> {
        self.alerts.iter_mut().find(|alert| alert.id == id)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub fn schema_version_default() -> u32 {
        CURRENT_SCHEMA_VERSION
    }
}

/// Removes the first element matching `predicate`, returning it.
pub(crate) fn take_where<T>(items: &mut Vec<T>, predicate: impl Fn(&T) -> bool) -> Option<T> {
    let index = items.iter().position(predicate)?;
    Some(items.remove(index))
}
