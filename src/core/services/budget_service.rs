//! Budget CRUD and limit tracking.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::summary_service::SummaryService;
use crate::errors::{FinanceError, Result};
use crate::ledger::{
    category::same_category, ledger::take_where, Budget, BudgetPatch, BudgetUsage, Ledger,
};

pub struct BudgetService;

impl BudgetService {
    /// Adds a budget under a fresh id. At most one budget per category is a
    /// caller convention; duplicates are accepted here.
    pub fn add(ledger: &mut Ledger, mut budget: Budget) -> Result<Uuid> {
        budget.id = Uuid::new_v4();
        budget.validate()?;
        let id = budget.id;
        ledger.budgets.push(budget);
        tracing::debug!(%id, "budget added");
        Ok(id)
    }

    pub fn update(ledger: &mut Ledger, id: Uuid, patch: BudgetPatch) -> Result<()> {
        let budget = ledger
            .budget_mut(id)
            .ok_or_else(|| FinanceError::not_found("budget", id))?;
        let mut updated = budget.clone();
        updated.apply(patch);
        updated.validate()?;
        *budget = updated;
        Ok(())
    }

    /// Removes a budget together with any share tokens pointing at it.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<Budget> {
        let removed = take_where(&mut ledger.budgets, |budget| budget.id == id)
            .ok_or_else(|| FinanceError::not_found("budget", id))?;
        ledger.shared_budgets.retain(|share| share.budget_id != id);
        Ok(removed)
    }

    /// First budget whose normalized category matches `category`.
    pub fn for_category<'a>(ledger: &'a Ledger, category: &str) -> Option<&'a Budget> {
        ledger
            .budgets
            .iter()
            .find(|budget| same_category(&budget.category, category))
    }

    pub fn usage(ledger: &Ledger, budget: &Budget) -> BudgetUsage {
        let spent = SummaryService::category_spending(ledger, &budget.category);
        let percent_used = if budget.limit.is_zero() {
            Decimal::ZERO
        } else {
            spent / budget.limit * Decimal::ONE_HUNDRED
        };
        BudgetUsage {
            budget_id: budget.id,
            category: budget.category.clone(),
            limit: budget.limit,
            spent,
            remaining: budget.limit - spent,
            percent_used,
            over_limit: spent > budget.limit,
        }
    }

    pub fn usage_all(ledger: &Ledger) -> Vec<BudgetUsage> {
        ledger
            .budgets
            .iter()
            .map(|budget| Self::usage(ledger, budget))
            .collect()
    }
}
