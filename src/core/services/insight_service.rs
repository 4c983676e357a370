//! Rule-based observations about the ledger. Results are recomputed per call.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::{report_service::ReportService, summary_service::SummaryService};
use crate::errors::Result;
use crate::ledger::{Insight, InsightKind, Ledger};

/// Share of monthly income above which spending triggers a warning.
pub fn expense_ratio_threshold() -> Decimal {
    Decimal::new(8, 1)
}

pub struct InsightService;

impl InsightService {
    /// Evaluates the fixed rule list in order. Each rule adds at most one insight.
    pub fn insights(ledger: &Ledger, today: NaiveDate) -> Result<Vec<Insight>> {
        let mut insights = Vec::new();

        let balance = SummaryService::balance(ledger);
        if balance < Decimal::ZERO {
            insights.push(Insight {
                kind: InsightKind::Warning,
                title: "Negative balance".into(),
                message: format!(
                    "Your expenses exceed your income by {}.",
                    balance.abs().round_dp(2)
                ),
            });
        }

        let analysis = ReportService::category_analysis(ledger);
        if !analysis.problem_categories.is_empty() {
            insights.push(Insight {
                kind: InsightKind::Info,
                title: "High spending categories".into(),
                message: format!(
                    "These categories are well above your average spending: {}.",
                    analysis.problem_categories.join(", ")
                ),
            });
        }

        let month = ReportService::monthly_report(ledger, today.year(), today.month())?;
        if month.expenses > month.income * expense_ratio_threshold() {
            insights.push(Insight {
                kind: InsightKind::Warning,
                title: "High spending this month".into(),
                message: format!(
                    "You have spent {} of {} earned this month.",
                    month.expenses.round_dp(2),
                    month.income.round_dp(2)
                ),
            });
        }

        Ok(insights)
    }
}
