//! Ledger domain models, persistence-friendly types, and helpers.

pub mod alert;
pub mod budget;
pub mod category;
pub mod goal;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod recurring;
pub mod report;
pub mod sharing;
pub mod template;
pub mod time_interval;
pub mod transaction;

pub use alert::{Alert, AlertKind};
pub use budget::{Budget, BudgetPatch, BudgetPeriod};
pub use category::{normalize_category, CategoryKind, CustomCategory, CANONICAL_CATEGORIES};
pub use goal::{FinancialGoal, GoalKind, GoalPatch};
pub use ledger::{Ledger, CURRENT_SCHEMA_VERSION};
pub use recurring::{Frequency, RecurringPatch, RecurringRule};
pub use report::{
    BudgetUsage, CategoryAnalysis, CategoryTotal, FinancialProjection, GoalProgress, Insight,
    InsightKind, MonthlyReport, Period, PeriodComparison, ProjectionPoint, YearlyReport,
};
pub use sharing::{SharePermission, SharedBudget};
pub use template::{BudgetTemplate, TemplateEntry};
pub use time_interval::{DateWindow, TimeInterval, TimeUnit};
pub use transaction::{Transaction, TransactionKind, TransactionPatch};
