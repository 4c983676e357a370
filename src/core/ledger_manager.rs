use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::services::{
    AlertService, BudgetService, CategoryService, GoalService, InsightService, RecurrenceService,
    ReportService, SharingService, SummaryService, TemplateService, TransactionService,
};
use super::time::{Clock, SystemClock};
use crate::config::{Config, ConfigManager};
use crate::errors::{FinanceError, Result};
use crate::ledger::{
    Alert, Budget, BudgetPatch, BudgetTemplate, BudgetUsage, CategoryAnalysis, CategoryKind,
    CustomCategory, FinancialGoal, FinancialProjection, GoalPatch, GoalProgress, Insight, Ledger,
    MonthlyReport, Period, PeriodComparison, RecurringPatch, RecurringRule, SharePermission,
    SharedBudget, Transaction, TransactionPatch, YearlyReport, CURRENT_SCHEMA_VERSION,
};
use crate::storage::{BackupInfo, JsonStorage, MemoryStorage, StateStorage};

/// Owns the finance state and writes every change through to storage.
///
/// All mutations run against a staged copy of the state. The copy replaces the
/// live state only after it has been persisted, so readers never see a change
/// that failed to save.
pub struct LedgerManager {
    state: Mutex<Ledger>,
    storage: Box<dyn StateStorage>,
    clock: Arc<dyn Clock>,
    config: Config,
}

impl LedgerManager {
    /// Loads the persisted state once, starting empty when nothing was saved.
    pub fn open(
        storage: Box<dyn StateStorage>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Result<Self> {
        let ledger = match storage.load()? {
            Some(ledger) => Self::migrate(ledger)?,
            None => {
                tracing::debug!("no persisted state, starting with an empty ledger");
                Ledger::started_at(clock.now())
            }
        };
        Ok(Self {
            state: Mutex::new(ledger),
            storage,
            clock,
            config,
        })
    }

    /// Opens the JSON store configured under the manager's base directory.
    pub fn from_config(config_manager: &ConfigManager) -> Result<Self> {
        let config = config_manager.load()?;
        let root = config.resolve_data_root(config_manager.base_dir());
        let storage = JsonStorage::new(root, Some(config.backup_retention))?;
        Self::open(Box::new(storage), Arc::new(SystemClock), config)
    }

    /// Non-durable manager for tests and throwaway sessions.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(Ledger::started_at(clock.now())),
            storage: Box::new(MemoryStorage::new()),
            clock,
            config: Config::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn storage(&self) -> &dyn StateStorage {
        self.storage.as_ref()
    }

    /// Runs `f` against the committed state.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&*self.lock())
    }

    pub fn snapshot(&self) -> Ledger {
        self.lock().clone()
    }

    /// Applies `f` to a staged copy, persists it, then commits it.
    ///
    /// Nothing is written when `f` fails or leaves the state unchanged. A
    /// changed state is stamped with the clock's `now` before it is saved.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Ledger) -> Result<R>) -> Result<R> {
        let mut guard = self.lock();
        let mut staged = guard.clone();
        let output = f(&mut staged)?;
        if staged != *guard {
            staged.touch(self.clock.now());
            self.storage.save(&staged)?;
            *guard = staged;
        }
        Ok(output)
    }

    // Transactions

    pub fn add_transaction(&self, transaction: Transaction) -> Result<Uuid> {
        self.mutate(|ledger| TransactionService::add(ledger, transaction))
    }

    pub fn update_transaction(&self, id: Uuid, patch: TransactionPatch) -> Result<()> {
        self.mutate(|ledger| TransactionService::update(ledger, id, patch))
    }

    pub fn delete_transaction(&self, id: Uuid) -> Result<Transaction> {
        self.mutate(|ledger| TransactionService::remove(ledger, id))
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.read(|ledger| ledger.transactions.clone())
    }

    // Budgets

    pub fn add_budget(&self, budget: Budget) -> Result<Uuid> {
        self.mutate(|ledger| BudgetService::add(ledger, budget))
    }

    pub fn update_budget(&self, id: Uuid, patch: BudgetPatch) -> Result<()> {
        self.mutate(|ledger| BudgetService::update(ledger, id, patch))
    }

    pub fn delete_budget(&self, id: Uuid) -> Result<Budget> {
        self.mutate(|ledger| BudgetService::remove(ledger, id))
    }

    pub fn budgets(&self) -> Vec<Budget> {
        self.read(|ledger| ledger.budgets.clone())
    }

    pub fn budget_for_category(&self, category: &str) -> Option<Budget> {
        self.read(|ledger| BudgetService::for_category(ledger, category).cloned())
    }

    pub fn budget_usage(&self) -> Vec<BudgetUsage> {
        self.read(BudgetService::usage_all)
    }

    // Goals

    pub fn add_goal(&self, goal: FinancialGoal) -> Result<Uuid> {
        let now = self.clock.now();
        self.mutate(|ledger| GoalService::add(ledger, goal, now))
    }

    pub fn update_goal(&self, id: Uuid, patch: GoalPatch) -> Result<()> {
        self.mutate(|ledger| GoalService::update(ledger, id, patch))
    }

    pub fn update_goal_progress(&self, id: Uuid, current_amount: Decimal) -> Result<()> {
        self.mutate(|ledger| GoalService::update_progress(ledger, id, current_amount))
    }

    pub fn delete_goal(&self, id: Uuid) -> Result<FinancialGoal> {
        self.mutate(|ledger| GoalService::remove(ledger, id))
    }

    pub fn goals(&self) -> Vec<FinancialGoal> {
        self.read(|ledger| ledger.goals.clone())
    }

    pub fn goal_progress(&self, id: Uuid) -> Result<GoalProgress> {
        let today = self.clock.today();
        self.read(|ledger| GoalService::progress(ledger, id, today))
    }

    // Recurring rules

    pub fn add_recurring(&self, rule: RecurringRule) -> Result<Uuid> {
        self.mutate(|ledger| RecurrenceService::add(ledger, rule))
    }

    pub fn update_recurring(&self, id: Uuid, patch: RecurringPatch) -> Result<()> {
        self.mutate(|ledger| RecurrenceService::update(ledger, id, patch))
    }

    pub fn toggle_recurring(&self, id: Uuid) -> Result<bool> {
        self.mutate(|ledger| RecurrenceService::toggle(ledger, id))
    }

    pub fn delete_recurring(&self, id: Uuid) -> Result<RecurringRule> {
        self.mutate(|ledger| RecurrenceService::remove(ledger, id))
    }

    pub fn recurring_rules(&self) -> Vec<RecurringRule> {
        self.read(|ledger| ledger.recurring.clone())
    }

    /// Materializes at most one occurrence per due rule as of the clock's today.
    pub fn process_recurring(&self) -> Result<Vec<Transaction>> {
        let today = self.clock.today();
        self.mutate(|ledger| Ok(RecurrenceService::process_due(ledger, today)))
    }

    // Aggregates

    pub fn total_income(&self) -> Decimal {
        self.read(SummaryService::total_income)
    }

    pub fn total_expenses(&self) -> Decimal {
        self.read(SummaryService::total_expenses)
    }

    pub fn balance(&self) -> Decimal {
        self.read(SummaryService::balance)
    }

    pub fn category_spending(&self, category: &str) -> Decimal {
        self.read(|ledger| SummaryService::category_spending(ledger, category))
    }

    // Reports

    pub fn monthly_report(&self, year: i32, month: u32) -> Result<MonthlyReport> {
        self.read(|ledger| ReportService::monthly_report(ledger, year, month))
    }

    pub fn yearly_report(&self, year: i32) -> Result<YearlyReport> {
        self.read(|ledger| ReportService::yearly_report(ledger, year))
    }

    pub fn compare_periods(&self, period1: Period, period2: Period) -> Result<PeriodComparison> {
        self.read(|ledger| ReportService::compare_periods(ledger, period1, period2))
    }

    pub fn financial_projection(&self, months: u32) -> Result<FinancialProjection> {
        let today = self.clock.today();
        self.read(|ledger| ReportService::financial_projection(ledger, today, months))
    }

    pub fn category_analysis(&self) -> CategoryAnalysis {
        self.read(ReportService::category_analysis)
    }

    pub fn insights(&self) -> Result<Vec<Insight>> {
        let today = self.clock.today();
        self.read(|ledger| InsightService::insights(ledger, today))
    }

    // Alerts

    pub fn check_budget_alerts(&self, user_id: Uuid) -> Result<Vec<Alert>> {
        let now = self.clock.now();
        let settings = &self.config.alerts;
        self.mutate(|ledger| Ok(AlertService::check_budget_alerts(ledger, user_id, settings, now)))
    }

    pub fn check_balance_alerts(&self, user_id: Uuid) -> Result<Vec<Alert>> {
        let now = self.clock.now();
        let settings = &self.config.alerts;
        self.mutate(|ledger| Ok(AlertService::check_balance_alerts(ledger, user_id, settings, now)))
    }

    pub fn check_goal_alerts(&self, user_id: Uuid) -> Result<Vec<Alert>> {
        let now = self.clock.now();
        let settings = &self.config.alerts;
        self.mutate(|ledger| Ok(AlertService::check_goal_alerts(ledger, user_id, settings, now)))
    }

    pub fn check_recurring_alerts(&self, user_id: Uuid) -> Result<Vec<Alert>> {
        let now = self.clock.now();
        let settings = &self.config.alerts;
        self.mutate(|ledger| {
            Ok(AlertService::check_recurring_alerts(ledger, user_id, settings, now))
        })
    }

    pub fn run_alert_checks(&self, user_id: Uuid) -> Result<Vec<Alert>> {
        let now = self.clock.now();
        let settings = &self.config.alerts;
        self.mutate(|ledger| Ok(AlertService::run_all(ledger, user_id, settings, now)))
    }

    pub fn add_custom_alert(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        action_url: Option<String>,
    ) -> Result<Uuid> {
        let now = self.clock.now();
        self.mutate(|ledger| AlertService::add_custom(ledger, user_id, title, message, action_url, now))
    }

    pub fn mark_alert_read(&self, id: Uuid) -> Result<()> {
        self.mutate(|ledger| AlertService::mark_read(ledger, id))
    }

    pub fn mark_all_alerts_read(&self, user_id: Uuid) -> Result<usize> {
        self.mutate(|ledger| Ok(AlertService::mark_all_read(ledger, user_id)))
    }

    pub fn delete_alert(&self, id: Uuid) -> Result<Alert> {
        self.mutate(|ledger| AlertService::remove(ledger, id))
    }

    pub fn clear_alerts(&self, user_id: Uuid) -> Result<usize> {
        self.mutate(|ledger| Ok(AlertService::clear(ledger, user_id)))
    }

    pub fn unread_alert_count(&self, user_id: Uuid) -> usize {
        self.read(|ledger| AlertService::unread_count(ledger, user_id))
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.read(|ledger| ledger.alerts.clone())
    }

    // Sharing

    pub fn share_budget(
        &self,
        budget_id: Uuid,
        created_by: Uuid,
        permission: SharePermission,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<SharedBudget> {
        let now = self.clock.now();
        self.mutate(|ledger| {
            SharingService::share_budget(ledger, budget_id, created_by, permission, expires_at, now)
        })
    }

    /// Resolves a share token against the clock. Expired tokens resolve to `None`.
    pub fn resolve_share(&self, token: &str) -> Option<(SharedBudget, Budget)> {
        let now = self.clock.now();
        self.read(|ledger| {
            SharingService::resolve(ledger, token, now)
                .map(|(share, budget)| (share.clone(), budget.clone()))
        })
    }

    pub fn revoke_share(&self, id: Uuid) -> Result<SharedBudget> {
        self.mutate(|ledger| SharingService::revoke(ledger, id))
    }

    // Custom categories

    pub fn add_custom_category(&self, category: CustomCategory) -> Result<Uuid> {
        self.mutate(|ledger| CategoryService::add(ledger, category))
    }

    pub fn update_custom_category(&self, id: Uuid, changes: CustomCategory) -> Result<()> {
        self.mutate(|ledger| CategoryService::edit(ledger, id, changes))
    }

    pub fn delete_custom_category(&self, id: Uuid) -> Result<CustomCategory> {
        self.mutate(|ledger| CategoryService::remove(ledger, id))
    }

    pub fn available_categories(&self, user_id: Uuid, kind: CategoryKind) -> Vec<String> {
        self.read(|ledger| CategoryService::available(ledger, user_id, kind))
    }

    // Budget templates

    pub fn add_template(&self, template: BudgetTemplate) -> Result<Uuid> {
        self.mutate(|ledger| TemplateService::add(ledger, template))
    }

    pub fn delete_template(&self, id: Uuid) -> Result<BudgetTemplate> {
        self.mutate(|ledger| TemplateService::remove(ledger, id))
    }

    pub fn apply_template(&self, id: Uuid) -> Result<Vec<Uuid>> {
        self.mutate(|ledger| TemplateService::apply(ledger, id))
    }

    // Backups

    pub fn backup(&self, note: Option<&str>) -> Result<PathBuf> {
        let _guard = self.lock();
        self.storage.backup(note)
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        self.storage.list_backups()
    }

    /// Restores a backup and replaces the in-memory state with it.
    pub fn restore_backup(&self, name: &str) -> Result<()> {
        let mut guard = self.lock();
        let restored = Self::migrate(self.storage.restore_backup(name)?)?;
        *guard = restored;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn migrate(mut ledger: Ledger) -> Result<Ledger> {
        if ledger.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(FinanceError::UnsupportedSchema(ledger.schema_version));
        }
        if ledger.schema_version < CURRENT_SCHEMA_VERSION {
            tracing::info!(
                from = ledger.schema_version,
                to = CURRENT_SCHEMA_VERSION,
                "upgrading persisted state schema"
            );
            ledger.schema_version = CURRENT_SCHEMA_VERSION;
        }
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::ledger::BudgetPeriod;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingStorage {
        saves: AtomicUsize,
    }

    impl StateStorage for FailingStorage {
        fn load(&self) -> Result<Option<Ledger>> {
            Ok(None)
        }

        fn save(&self, _ledger: &Ledger) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Err(FinanceError::Persistence("disk full".into()))
        }
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::at_date(
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        ))
    }

    #[test]
    fn failed_save_leaves_state_untouched() {
        let storage = FailingStorage {
            saves: AtomicUsize::new(0),
        };
        let manager = LedgerManager::open(Box::new(storage), clock(), Config::default()).unwrap();
        let txn = Transaction::income(
            Decimal::from(100),
            "salary",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        assert!(matches!(
            manager.add_transaction(txn),
            Err(FinanceError::Persistence(_))
        ));
        assert!(manager.transactions().is_empty());
    }

    #[test]
    fn timestamps_come_from_the_clock() {
        let clock = clock();
        let manager = LedgerManager::in_memory(clock.clone());
        clock.advance(chrono::Duration::hours(3));
        let id = manager
            .add_goal(FinancialGoal::new(
                Uuid::new_v4(),
                "Bike",
                Decimal::from(800),
                NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
                crate::ledger::GoalKind::Savings,
            ))
            .unwrap();
        let state = manager.snapshot();
        assert_eq!(state.goal(id).unwrap().created_at, clock.now());
        assert_eq!(state.updated_at, clock.now());
        assert!(state.created_at < state.updated_at);
    }

    #[test]
    fn validation_errors_skip_persistence() {
        let manager = LedgerManager::in_memory(clock());
        let bad = Budget::new("food", Decimal::from(-5), BudgetPeriod::Monthly);
        assert!(matches!(
            manager.add_budget(bad),
            Err(FinanceError::Validation(_))
        ));
        assert!(manager.storage().load().unwrap().is_none());
    }

    #[test]
    fn unknown_ids_report_not_found() {
        let manager = LedgerManager::in_memory(clock());
        let missing = Uuid::new_v4();
        assert!(matches!(
            manager.delete_transaction(missing),
            Err(FinanceError::NotFound { entity: "transaction", .. })
        ));
        assert!(matches!(
            manager.update_goal_progress(missing, Decimal::ONE),
            Err(FinanceError::NotFound { entity: "goal", .. })
        ));
    }

    #[test]
    fn rejects_future_schema_versions() {
        let mut future = Ledger::new();
        future.schema_version = CURRENT_SCHEMA_VERSION + 5;
        let storage = MemoryStorage::with_ledger(&future).unwrap();
        let err = LedgerManager::open(Box::new(storage), clock(), Config::default())
            .err()
            .expect("future schema should fail");
        assert!(matches!(err, FinanceError::UnsupportedSchema(v) if v == CURRENT_SCHEMA_VERSION + 5));
    }

    #[test]
    fn process_recurring_uses_clock_today() {
        let clock = clock();
        let manager = LedgerManager::in_memory(clock.clone());
        manager
            .add_recurring(RecurringRule::new(
                Uuid::new_v4(),
                crate::ledger::TransactionKind::Expense,
                Decimal::from(1200),
                "housing",
                "Rent",
                crate::ledger::Frequency::Monthly,
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            ))
            .unwrap();
        assert!(manager.process_recurring().unwrap().is_empty());

        clock.set_date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        let created = manager.process_recurring().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(manager.total_expenses(), Decimal::from(1200));
    }
}
