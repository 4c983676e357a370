//! Derived, read-only views computed from the ledger on demand.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A calendar month used by period comparisons.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    pub transaction_count: usize,
    /// Expense totals keyed by the stored category string.
    pub category_breakdown: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearlyReport {
    pub year: i32,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net: Decimal,
    pub transaction_count: usize,
    pub category_breakdown: BTreeMap<String, Decimal>,
    pub months: Vec<MonthlyReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodComparison {
    pub period1: MonthlyReport,
    pub period2: MonthlyReport,
    pub income_change: Decimal,
    pub expense_change: Decimal,
    /// Zero when the first period had no income.
    pub income_change_percent: Decimal,
    /// Zero when the first period had no expenses.
    pub expense_change_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionPoint {
    pub year: i32,
    pub month: u32,
    pub projected_income: Decimal,
    pub projected_expenses: Decimal,
    pub projected_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialProjection {
    pub current_balance: Decimal,
    pub average_income: Decimal,
    pub average_expenses: Decimal,
    pub points: Vec<ProjectionPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryAnalysis {
    /// Sorted by amount, largest first.
    pub categories: Vec<CategoryTotal>,
    pub average: Decimal,
    pub problem_categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetUsage {
    pub budget_id: Uuid,
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percent_used: Decimal,
    pub over_limit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub percent: Decimal,
    pub remaining: Decimal,
    pub achieved: bool,
    pub days_left: i64,
}
