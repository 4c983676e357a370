//! Share tokens for individual budgets.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{FinanceError, Result};
use crate::ledger::{ledger::take_where, Budget, Ledger, SharePermission, SharedBudget};

pub struct SharingService;

impl SharingService {
    /// Issues a token for an existing budget. Expiry is only checked when the
    /// token is resolved.
    pub fn share_budget(
        ledger: &mut Ledger,
        budget_id: Uuid,
        created_by: Uuid,
        permission: SharePermission,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<SharedBudget> {
        if ledger.budget(budget_id).is_none() {
            return Err(FinanceError::not_found("budget", budget_id));
        }
        let share = SharedBudget::new(budget_id, created_by, permission, expires_at, now);
        ledger.shared_budgets.push(share.clone());
        tracing::debug!(budget = %budget_id, share = %share.id, "budget shared");
        Ok(share)
    }

    /// Looks up a token. Unknown and expired tokens both resolve to `None`.
    pub fn resolve<'a>(
        ledger: &'a Ledger,
        token: &str,
        now: DateTime<Utc>,
    ) -> Option<(&'a SharedBudget, &'a Budget)> {
        let share = ledger
            .shared_budgets
            .iter()
            .find(|share| share.share_token == token)?;
        if share.is_expired(now) {
            return None;
        }
        let budget = ledger.budget(share.budget_id)?;
        Some((share, budget))
    }

    pub fn revoke(ledger: &mut Ledger, id: Uuid) -> Result<SharedBudget> {
        let removed = take_where(&mut ledger.shared_budgets, |share| share.id == id)
            .ok_or_else(|| FinanceError::not_found("shared budget", id))?;
        Ok(removed)
    }
}
