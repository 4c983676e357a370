use uuid::Uuid;

use crate::errors::{FinanceError, Result};
use crate::ledger::{ledger::take_where, BudgetTemplate, Ledger};

pub struct TemplateService;

impl TemplateService {
    pub fn add(ledger: &mut Ledger, mut template: BudgetTemplate) -> Result<Uuid> {
        template.id = Uuid::new_v4();
        template.validate()?;
        let id = template.id;
        ledger.budget_templates.push(template);
        Ok(id)
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<BudgetTemplate> {
        let removed = take_where(&mut ledger.budget_templates, |template| template.id == id)
            .ok_or_else(|| FinanceError::not_found("budget template", id))?;
        Ok(removed)
    }

    /// Creates one budget per template entry and returns the new budget ids.
    pub fn apply(ledger: &mut Ledger, id: Uuid) -> Result<Vec<Uuid>> {
        let template = ledger
            .budget_templates
            .iter()
            .find(|template| template.id == id)
            .ok_or_else(|| FinanceError::not_found("budget template", id))?;
        let budgets = template.to_budgets();
        budgets.iter().try_for_each(|budget| budget.validate())?;
        let ids: Vec<Uuid> = budgets.iter().map(|budget| budget.id).collect();
        ledger.budgets.extend(budgets);
        tracing::debug!(template = %id, count = ids.len(), "budget template applied");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{BudgetPeriod, TemplateEntry};
    use rust_decimal::Decimal;

    fn starter(user: Uuid) -> BudgetTemplate {
        BudgetTemplate::new(
            user,
            "Starter",
            vec![
                TemplateEntry {
                    category: "food".into(),
                    limit: Decimal::from(400),
                    period: BudgetPeriod::Monthly,
                },
                TemplateEntry {
                    category: "travel".into(),
                    limit: Decimal::from(2000),
                    period: BudgetPeriod::Yearly,
                },
            ],
        )
    }

    #[test]
    fn apply_creates_fresh_budgets_each_time() {
        let mut ledger = Ledger::new();
        let id = TemplateService::add(&mut ledger, starter(Uuid::new_v4())).unwrap();

        let first = TemplateService::apply(&mut ledger, id).unwrap();
        let second = TemplateService::apply(&mut ledger, id).unwrap();
        assert_eq!(first.len(), 2);
        assert_ne!(first, second);
        assert_eq!(ledger.budgets.len(), 4);
        assert_eq!(ledger.budgets[1].period, BudgetPeriod::Yearly);
    }

    #[test]
    fn invalid_entries_are_rejected_on_add() {
        let mut ledger = Ledger::new();
        let mut template = starter(Uuid::new_v4());
        template.entries[0].limit = Decimal::ZERO;
        assert!(matches!(
            TemplateService::add(&mut ledger, template),
            Err(FinanceError::Validation(_))
        ));
        assert!(ledger.budget_templates.is_empty());
    }
}
