//! Services related to recurring transaction rules.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{FinanceError, Result};
use crate::ledger::{ledger::take_where, Ledger, RecurringPatch, RecurringRule, Transaction};

pub struct RecurrenceService;

impl RecurrenceService {
    /// Registers a rule. The first due date is always the start date.
    pub fn add(ledger: &mut Ledger, mut rule: RecurringRule) -> Result<Uuid> {
        rule.id = Uuid::new_v4();
        rule.next_due_date = rule.start_date;
        rule.validate()?;
        let id = rule.id;
        ledger.recurring.push(rule);
        tracing::debug!(%id, "recurring rule added");
        Ok(id)
    }

    pub fn update(ledger: &mut Ledger, id: Uuid, patch: RecurringPatch) -> Result<()> {
        let rule = ledger
            .recurring_rule_mut(id)
            .ok_or_else(|| FinanceError::not_found("recurring rule", id))?;
        let mut updated = rule.clone();
        updated.apply(patch);
        updated.validate()?;
        *rule = updated;
        Ok(())
    }

    /// Flips the active flag and returns the new value.
    pub fn toggle(ledger: &mut Ledger, id: Uuid) -> Result<bool> {
        let rule = ledger
            .recurring_rule_mut(id)
            .ok_or_else(|| FinanceError::not_found("recurring rule", id))?;
        rule.is_active = !rule.is_active;
        let active = rule.is_active;
        Ok(active)
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<RecurringRule> {
        let removed = take_where(&mut ledger.recurring, |rule| rule.id == id)
            .ok_or_else(|| FinanceError::not_found("recurring rule", id))?;
        Ok(removed)
    }

    /// Materializes at most one transaction per due rule and advances each of
    /// those rules by a single period. Rules that missed several periods catch
    /// up one period per call.
    pub fn process_due(ledger: &mut Ledger, today: NaiveDate) -> Vec<Transaction> {
        let created: Vec<Transaction> = ledger
            .recurring
            .iter_mut()
            .filter(|rule| rule.is_due(today))
            .map(RecurringRule::materialize_next)
            .collect();
        if !created.is_empty() {
            ledger.transactions.extend(created.iter().cloned());
            tracing::info!(count = created.len(), %today, "recurring transactions materialized");
        }
        created
    }

    pub fn due_rules(ledger: &Ledger, today: NaiveDate) -> Vec<&RecurringRule> {
        ledger
            .recurring
            .iter()
            .filter(|rule| rule.is_due(today))
            .collect()
    }
}
