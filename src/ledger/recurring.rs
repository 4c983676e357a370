use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    time_interval::{TimeInterval, TimeUnit},
    transaction::{Transaction, TransactionKind},
};
use crate::errors::{FinanceError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn interval(self) -> TimeInterval {
        let unit = match self {
            Frequency::Daily => TimeUnit::Day,
            Frequency::Weekly => TimeUnit::Week,
            Frequency::Monthly => TimeUnit::Month,
            Frequency::Yearly => TimeUnit::Year,
        };
        TimeInterval::single(unit)
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

/// Template that materializes one transaction per due period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringRule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub next_due_date: NaiveDate,
    #[serde(default = "RecurringRule::default_active")]
    pub is_active: bool,
}

impl RecurringRule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        kind: TransactionKind,
        amount: Decimal,
        category: impl Into<String>,
        description: impl Into<String>,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            amount,
            category: category.into(),
            description: description.into(),
            frequency,
            start_date,
            end_date: None,
            next_due_date: start_date,
            is_active: true,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn default_active() -> bool {
        true
    }

    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(FinanceError::invalid(format!(
                "recurring amount must be positive, got {}",
                self.amount
            )));
        }
        if self.category.trim().is_empty() {
            return Err(FinanceError::invalid("recurring category is required"));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(FinanceError::invalid(format!(
                    "recurring end date {} precedes start date {}",
                    end, self.start_date
                )));
            }
        }
        Ok(())
    }

    /// Whether `today` has passed the configured end date.
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| today > end)
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.is_active && self.next_due_date <= today && !self.has_ended(today)
    }

    /// Builds the transaction for the current due date and moves the schedule
    /// forward by exactly one frequency unit.
    pub fn materialize_next(&mut self) -> Transaction {
        let txn = Transaction::new(
            self.kind,
            self.amount,
            self.category.clone(),
            self.next_due_date,
            self.description.clone(),
        );
        self.next_due_date = self.frequency.interval().next_date(self.next_due_date);
        txn
    }

    pub fn apply(&mut self, patch: RecurringPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(frequency) = patch.frequency {
            self.frequency = frequency;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(next_due) = patch.next_due_date {
            self.next_due_date = next_due;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecurringPatch {
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    pub end_date: Option<Option<NaiveDate>>,
    pub next_due_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rent(start: NaiveDate) -> RecurringRule {
        RecurringRule::new(
            Uuid::new_v4(),
            TransactionKind::Expense,
            Decimal::from(1200),
            "housing",
            "Rent",
            Frequency::Monthly,
            start,
        )
    }

    #[test]
    fn new_rule_is_due_on_start_date() {
        let rule = rent(date(2025, 3, 1));
        assert_eq!(rule.next_due_date, date(2025, 3, 1));
        assert!(!rule.is_due(date(2025, 2, 28)));
        assert!(rule.is_due(date(2025, 3, 1)));
    }

    #[test]
    fn materialize_advances_one_unit() {
        let mut rule = rent(date(2025, 1, 15));
        let txn = rule.materialize_next();
        assert_eq!(txn.date, date(2025, 1, 15));
        assert_eq!(txn.amount, Decimal::from(1200));
        assert_eq!(txn.description, "Rent");
        assert_eq!(rule.next_due_date, date(2025, 2, 15));
    }

    #[test]
    fn ended_or_inactive_rules_are_not_due() {
        let mut rule = rent(date(2025, 1, 1)).with_end_date(date(2025, 1, 31));
        assert!(!rule.is_due(date(2025, 2, 1)));
        rule.end_date = None;
        rule.is_active = false;
        assert!(!rule.is_due(date(2025, 2, 1)));
    }

    #[test]
    fn validate_rejects_end_before_start() {
        let rule = rent(date(2025, 5, 1)).with_end_date(date(2025, 4, 1));
        assert!(matches!(rule.validate(), Err(FinanceError::Validation(_))));
    }
}
