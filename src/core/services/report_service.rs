//! Monthly, yearly, comparison, projection, and category reports.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::summary_service::SummaryService;
use crate::errors::{FinanceError, Result};
use crate::ledger::{
    time_interval::shift_month, CategoryAnalysis, CategoryTotal, DateWindow, FinancialProjection,
    Ledger, MonthlyReport, Period, PeriodComparison, ProjectionPoint, Transaction, YearlyReport,
};

/// Number of completed months averaged by the projection.
pub const PROJECTION_LOOKBACK_MONTHS: u32 = 3;

/// Categories spending more than this multiple of the mean are flagged.
pub fn problem_category_multiplier() -> Decimal {
    Decimal::new(15, 1)
}

pub struct ReportService;

impl ReportService {
    pub fn monthly_report(ledger: &Ledger, year: i32, month: u32) -> Result<MonthlyReport> {
        let window = DateWindow::month(year, month).ok_or_else(|| {
            FinanceError::invalid(format!("invalid report month {}-{}", year, month))
        })?;
        let transactions: Vec<&Transaction> = ledger
            .transactions
            .iter()
            .filter(|txn| window.contains(txn.date))
            .collect();
        let (income, expenses) = SummaryService::window_totals(ledger, window);
        Ok(MonthlyReport {
            year,
            month,
            income,
            expenses,
            net: income - expenses,
            transaction_count: transactions.len(),
            category_breakdown: expense_breakdown(transactions.into_iter()),
        })
    }

    /// Totals are summed from the twelve monthly reports while the count and
    /// breakdown are computed straight from the year's transactions.
    pub fn yearly_report(ledger: &Ledger, year: i32) -> Result<YearlyReport> {
        let window = DateWindow::year(year)
            .ok_or_else(|| FinanceError::invalid(format!("invalid report year {}", year)))?;
        let months = (1..=12)
            .map(|month| Self::monthly_report(ledger, year, month))
            .collect::<Result<Vec<_>>>()?;
        let total_income: Decimal = months.iter().map(|report| report.income).sum();
        let total_expenses: Decimal = months.iter().map(|report| report.expenses).sum();

        let in_year = || ledger.transactions.iter().filter(|txn| window.contains(txn.date));
        Ok(YearlyReport {
            year,
            total_income,
            total_expenses,
            net: total_income - total_expenses,
            transaction_count: in_year().count(),
            category_breakdown: expense_breakdown(in_year()),
            months,
        })
    }

    pub fn compare_periods(
        ledger: &Ledger,
        period1: Period,
        period2: Period,
    ) -> Result<PeriodComparison> {
        let first = Self::monthly_report(ledger, period1.year, period1.month)?;
        let second = Self::monthly_report(ledger, period2.year, period2.month)?;
        let income_change = second.income - first.income;
        let expense_change = second.expenses - first.expenses;
        Ok(PeriodComparison {
            income_change_percent: percent_change(income_change, first.income),
            expense_change_percent: percent_change(expense_change, first.expenses),
            income_change,
            expense_change,
            period1: first,
            period2: second,
        })
    }

    /// Linear projection from the average of the three months before `today`'s
    /// month, regardless of how many months are projected.
    pub fn financial_projection(
        ledger: &Ledger,
        today: NaiveDate,
        months: u32,
    ) -> Result<FinancialProjection> {
        let current_month = today.with_day(1).unwrap_or(today);
        let mut income_sum = Decimal::ZERO;
        let mut expense_sum = Decimal::ZERO;
        for back in 1..=PROJECTION_LOOKBACK_MONTHS {
            let month_start = shift_month(current_month, -(back as i32));
            let report = Self::monthly_report(ledger, month_start.year(), month_start.month())?;
            income_sum += report.income;
            expense_sum += report.expenses;
        }
        let lookback = Decimal::from(PROJECTION_LOOKBACK_MONTHS);
        let average_income = income_sum / lookback;
        let average_expenses = expense_sum / lookback;
        let monthly_net = average_income - average_expenses;
        let current_balance = SummaryService::balance(ledger);

        let points = (0..months)
            .map(|i| {
                let month_start = shift_month(current_month, i as i32 + 1);
                ProjectionPoint {
                    year: month_start.year(),
                    month: month_start.month(),
                    projected_income: average_income,
                    projected_expenses: average_expenses,
                    projected_balance: current_balance + monthly_net * Decimal::from(i + 1),
                }
            })
            .collect();

        Ok(FinancialProjection {
            current_balance,
            average_income,
            average_expenses,
            points,
        })
    }

    /// All-time expense totals per stored category, largest first.
    pub fn category_analysis(ledger: &Ledger) -> CategoryAnalysis {
        let mut totals: HashMap<&str, Decimal> = HashMap::new();
        for txn in ledger.transactions.iter().filter(|txn| txn.is_expense()) {
            *totals.entry(txn.category.as_str()).or_insert(Decimal::ZERO) += txn.amount;
        }
        let mut categories: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, amount)| CategoryTotal {
                category: category.to_string(),
                amount,
            })
            .collect();
        categories.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });

        let average = if categories.is_empty() {
            Decimal::ZERO
        } else {
            categories.iter().map(|entry| entry.amount).sum::<Decimal>()
                / Decimal::from(categories.len())
        };
        let threshold = average * problem_category_multiplier();
        let problem_categories = categories
            .iter()
            .filter(|entry| entry.amount > threshold)
            .map(|entry| entry.category.clone())
            .collect();

        CategoryAnalysis {
            categories,
            average,
            problem_categories,
        }
    }
}

/// `change / baseline` as a percentage; zero when the baseline is zero.
pub fn percent_change(change: Decimal, baseline: Decimal) -> Decimal {
    if baseline.is_zero() {
        Decimal::ZERO
    } else {
        change / baseline * Decimal::ONE_HUNDRED
    }
}

fn expense_breakdown<'a>(
    transactions: impl Iterator<Item = &'a Transaction>,
) -> BTreeMap<String, Decimal> {
    let mut breakdown: BTreeMap<String, Decimal> = BTreeMap::new();
    for txn in transactions.filter(|txn| txn.is_expense()) {
        *breakdown
            .entry(txn.category.clone())
            .or_insert(Decimal::ZERO) += txn.amount;
    }
    breakdown.retain(|_, amount| !amount.is_zero());
    breakdown
}
