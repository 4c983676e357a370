//! Financial goal CRUD and progress tracking.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::{FinanceError, Result};
use crate::ledger::{ledger::take_where, FinancialGoal, GoalPatch, GoalProgress, Ledger};

pub struct GoalService;

impl GoalService {
    /// Adds a goal under a fresh id. Progress always starts at zero regardless
    /// of the payload.
    pub fn add(ledger: &mut Ledger, mut goal: FinancialGoal, now: DateTime<Utc>) -> Result<Uuid> {
        goal.id = Uuid::new_v4();
        goal.current_amount = Decimal::ZERO;
        goal.created_at = now;
        goal.validate()?;
        let id = goal.id;
        ledger.goals.push(goal);
        tracing::debug!(%id, "goal added");
        Ok(id)
    }

    pub fn update(ledger: &mut Ledger, id: Uuid, patch: GoalPatch) -> Result<()> {
        let goal = ledger
            .goal_mut(id)
            .ok_or_else(|| FinanceError::not_found("goal", id))?;
        let mut updated = goal.clone();
        updated.apply(patch);
        updated.validate()?;
        *goal = updated;
        Ok(())
    }

    /// Sets the amount saved or paid toward the goal.
    pub fn update_progress(ledger: &mut Ledger, id: Uuid, current_amount: Decimal) -> Result<()> {
        if current_amount < Decimal::ZERO {
            return Err(FinanceError::invalid(format!(
                "goal progress cannot be negative, got {}",
                current_amount
            )));
        }
        let goal = ledger
            .goal_mut(id)
            .ok_or_else(|| FinanceError::not_found("goal", id))?;
        goal.current_amount = current_amount;
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<FinancialGoal> {
        let removed = take_where(&mut ledger.goals, |goal| goal.id == id)
            .ok_or_else(|| FinanceError::not_found("goal", id))?;
        Ok(removed)
    }

    pub fn progress(ledger: &Ledger, id: Uuid, today: NaiveDate) -> Result<GoalProgress> {
        let goal = ledger
            .goal(id)
            .ok_or_else(|| FinanceError::not_found("goal", id))?;
        Ok(GoalProgress {
            goal_id: goal.id,
            percent: goal.progress_percent(),
            remaining: goal.remaining(),
            achieved: goal.is_achieved(),
            days_left: (goal.deadline - today).num_days(),
        })
    }
}
