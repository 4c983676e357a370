//! Condition checks that append alerts, plus alert housekeeping.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    budget_service::BudgetService, recurrence_service::RecurrenceService,
    summary_service::SummaryService,
};
use crate::config::{AlertDedupPolicy, AlertSettings};
use crate::errors::{FinanceError, Result};
use crate::ledger::{ledger::take_where, Alert, AlertKind, Ledger};

pub struct AlertService;

impl AlertService {
    /// Appends a `budget_exceeded` alert for every budget whose category spend
    /// is above its limit.
    pub fn check_budget_alerts(
        ledger: &mut Ledger,
        user_id: Uuid,
        settings: &AlertSettings,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let candidates: Vec<Alert> = BudgetService::usage_all(ledger)
            .into_iter()
            .filter(|usage| usage.over_limit)
            .map(|usage| {
                Alert::new(
                    user_id,
                    AlertKind::BudgetExceeded,
                    format!("Budget exceeded: {}", usage.category),
                    format!(
                        "You have spent {} of your {} budget for {}.",
                        usage.spent.round_dp(2),
                        usage.limit.round_dp(2),
                        usage.category
                    ),
                    now,
                )
                .with_action("/budgets")
            })
            .collect();
        Self::record(ledger, candidates, settings.dedup_policy, now)
    }

    /// Appends a `low_balance` alert when the balance is negative or below the
    /// configured threshold.
    pub fn check_balance_alerts(
        ledger: &mut Ledger,
        user_id: Uuid,
        settings: &AlertSettings,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let balance = SummaryService::balance(ledger);
        let candidate = if balance < Decimal::ZERO {
            Some(Alert::new(
                user_id,
                AlertKind::LowBalance,
                "Negative balance",
                format!("Your balance is {}.", balance.round_dp(2)),
                now,
            ))
        } else if balance < settings.low_balance_threshold {
            Some(Alert::new(
                user_id,
                AlertKind::LowBalance,
                "Low balance",
                format!(
                    "Your balance of {} is below {}.",
                    balance.round_dp(2),
                    settings.low_balance_threshold.round_dp(2)
                ),
                now,
            ))
        } else {
            None
        };
        Self::record(
            ledger,
            candidate.into_iter().collect(),
            settings.dedup_policy,
            now,
        )
    }

    /// Appends a `goal_achieved` alert for each goal that reached its target.
    pub fn check_goal_alerts(
        ledger: &mut Ledger,
        user_id: Uuid,
        settings: &AlertSettings,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let candidates: Vec<Alert> = ledger
            .goals
            .iter()
            .filter(|goal| goal.is_achieved())
            .map(|goal| {
                Alert::new(
                    user_id,
                    AlertKind::GoalAchieved,
                    format!("Goal achieved: {}", goal.name),
                    format!(
                        "You reached {} of your {} target.",
                        goal.current_amount.round_dp(2),
                        goal.target_amount.round_dp(2)
                    ),
                    now,
                )
                .with_action("/goals")
            })
            .collect();
        Self::record(ledger, candidates, settings.dedup_policy, now)
    }

    /// Appends a `recurring_due` alert for each active rule that is due.
    pub fn check_recurring_alerts(
        ledger: &mut Ledger,
        user_id: Uuid,
        settings: &AlertSettings,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let today = now.date_naive();
        let candidates: Vec<Alert> = RecurrenceService::due_rules(ledger, today)
            .into_iter()
            .map(|rule| {
                let label = if rule.description.is_empty() {
                    rule.category.as_str()
                } else {
                    rule.description.as_str()
                };
                Alert::new(
                    user_id,
                    AlertKind::RecurringDue,
                    format!("Recurring transaction due: {}", label),
                    format!(
                        "{} {} was due on {}.",
                        rule.frequency.label(),
                        label,
                        rule.next_due_date
                    ),
                    now,
                )
                .with_action("/recurring")
            })
            .collect();
        Self::record(ledger, candidates, settings.dedup_policy, now)
    }

    /// Runs every check in a fixed order and returns all alerts appended.
    pub fn run_all(
        ledger: &mut Ledger,
        user_id: Uuid,
        settings: &AlertSettings,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let mut created = Self::check_budget_alerts(ledger, user_id, settings, now);
        created.extend(Self::check_balance_alerts(ledger, user_id, settings, now));
        created.extend(Self::check_goal_alerts(ledger, user_id, settings, now));
        created.extend(Self::check_recurring_alerts(ledger, user_id, settings, now));
        if !created.is_empty() {
            tracing::info!(%user_id, count = created.len(), "alerts raised");
        }
        created
    }

    pub fn add_custom(
        ledger: &mut Ledger,
        user_id: Uuid,
        title: impl Into<String>,
        message: impl Into<String>,
        action_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Uuid> {
        let mut alert = Alert::new(user_id, AlertKind::Custom, title, message, now);
        if alert.title.trim().is_empty() {
            return Err(FinanceError::invalid("alert title is required"));
        }
        alert.action_url = action_url;
        let id = alert.id;
        ledger.alerts.push(alert);
        Ok(id)
    }

    pub fn mark_read(ledger: &mut Ledger, id: Uuid) -> Result<()> {
        let alert = ledger
            .alert_mut(id)
            .ok_or_else(|| FinanceError::not_found("alert", id))?;
        alert.is_read = true;
        Ok(())
    }

    /// Marks all of the user's alerts read and returns how many changed.
    pub fn mark_all_read(ledger: &mut Ledger, user_id: Uuid) -> usize {
        let mut changed = 0;
        for alert in ledger
            .alerts
            .iter_mut()
            .filter(|alert| alert.user_id == user_id && !alert.is_read)
        {
            alert.is_read = true;
            changed += 1;
        }
        changed
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<Alert> {
        let removed = take_where(&mut ledger.alerts, |alert| alert.id == id)
            .ok_or_else(|| FinanceError::not_found("alert", id))?;
        Ok(removed)
    }

    pub fn clear(ledger: &mut Ledger, user_id: Uuid) -> usize {
        let before = ledger.alerts.len();
        ledger.alerts.retain(|alert| alert.user_id != user_id);
        let removed = before - ledger.alerts.len();
        removed
    }

    pub fn unread_count(ledger: &Ledger, user_id: Uuid) -> usize {
        ledger
            .alerts
            .iter()
            .filter(|alert| alert.user_id == user_id && !alert.is_read)
            .count()
    }

    fn record(
        ledger: &mut Ledger,
        candidates: Vec<Alert>,
        policy: AlertDedupPolicy,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let mut created = Vec::new();
        for alert in candidates {
            if is_suppressed(&ledger.alerts, &alert, policy, now) {
                tracing::debug!(title = %alert.title, "alert suppressed by dedup policy");
                continue;
            }
            ledger.alerts.push(alert.clone());
            created.push(alert);
        }
        created
    }
}

fn is_suppressed(
    existing: &[Alert],
    candidate: &Alert,
    policy: AlertDedupPolicy,
    now: DateTime<Utc>,
) -> bool {
    match policy {
        AlertDedupPolicy::Always => false,
        AlertDedupPolicy::UnlessUnread => existing
            .iter()
            .any(|alert| !alert.is_read && alert.same_condition(candidate)),
        AlertDedupPolicy::Cooldown { minutes } => {
            let window = Duration::minutes(minutes as i64);
            existing
                .iter()
                .any(|alert| alert.same_condition(candidate) && now - alert.created_at < window)
        }
    }
}
