mod common;

use std::collections::BTreeMap;

use common::{date, setup_test_env};
use finance_core::ledger::{Period, Transaction};
use finance_core::FinanceError;
use rust_decimal::Decimal;

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

#[test]
fn monthly_report_includes_boundaries_only() {
    let (manager, _, _) = setup_test_env(date(2025, 5, 1));
    for day in [date(2024, 2, 29), date(2024, 3, 1), date(2024, 3, 31), date(2024, 4, 1)] {
        manager
            .add_transaction(Transaction::expense(dec(10), "food", day))
            .unwrap();
    }
    let march = manager.monthly_report(2024, 3).unwrap();
    assert_eq!(march.transaction_count, 2);
    assert_eq!(march.expenses, dec(20));

    let february = manager.monthly_report(2024, 2).unwrap();
    assert_eq!(february.transaction_count, 1);
}

#[test]
fn december_window_closes_at_year_end() {
    let (manager, _, _) = setup_test_env(date(2025, 5, 1));
    manager
        .add_transaction(Transaction::income(dec(100), "salary", date(2024, 12, 31)))
        .unwrap();
    manager
        .add_transaction(Transaction::income(dec(100), "salary", date(2025, 1, 1)))
        .unwrap();
    assert_eq!(manager.monthly_report(2024, 12).unwrap().income, dec(100));
    assert!(matches!(
        manager.monthly_report(2024, 13),
        Err(FinanceError::Validation(_))
    ));
}

#[test]
fn yearly_totals_agree_with_monthly_reports() {
    let (manager, _, _) = setup_test_env(date(2025, 5, 1));
    let entries = [
        (date(2024, 1, 1), 3200, "salary", true),
        (date(2024, 1, 31), 120, "food", false),
        (date(2024, 3, 9), 40, "food", false),
        (date(2024, 4, 15), 60, "transport", false),
        (date(2024, 7, 4), 900, "freelance", true),
        (date(2024, 12, 31), 300, "gifts", false),
        (date(2023, 12, 31), 999, "food", false),
        (date(2025, 1, 1), 999, "salary", true),
    ];
    for (day, amount, category, income) in entries {
        let txn = if income {
            Transaction::income(dec(amount), category, day)
        } else {
            Transaction::expense(dec(amount), category, day)
        };
        manager.add_transaction(txn).unwrap();
    }

    let year = manager.yearly_report(2024).unwrap();
    let monthly: Vec<_> = (1..=12)
        .map(|month| manager.monthly_report(2024, month).unwrap())
        .collect();
    let income_sum: Decimal = monthly.iter().map(|report| report.income).sum();
    let expense_sum: Decimal = monthly.iter().map(|report| report.expenses).sum();
    let count_sum: usize = monthly.iter().map(|report| report.transaction_count).sum();

    assert_eq!(year.total_income, income_sum);
    assert_eq!(year.total_expenses, expense_sum);
    assert_eq!(year.transaction_count, count_sum);
    assert_eq!(year.total_income, dec(4100));
    assert_eq!(year.total_expenses, dec(520));
    assert_eq!(year.net, dec(3580));

    let breakdown_sum: Decimal = year.category_breakdown.values().copied().sum();
    assert_eq!(breakdown_sum, year.total_expenses);

    let mut merged: BTreeMap<String, Decimal> = BTreeMap::new();
    for report in &monthly {
        for (category, amount) in &report.category_breakdown {
            *merged.entry(category.clone()).or_default() += *amount;
        }
    }
    assert_eq!(year.category_breakdown, merged);
    assert_eq!(year.category_breakdown.get("food"), Some(&dec(160)));
}

#[test]
fn comparison_with_zero_baseline_reports_zero_percent() {
    let (manager, _, _) = setup_test_env(date(2025, 5, 1));
    manager
        .add_transaction(Transaction::income(dec(2000), "salary", date(2025, 2, 1)))
        .unwrap();
    manager
        .add_transaction(Transaction::expense(dec(100), "food", date(2025, 1, 10)))
        .unwrap();
    manager
        .add_transaction(Transaction::expense(dec(150), "food", date(2025, 2, 10)))
        .unwrap();

    let comparison = manager
        .compare_periods(Period::new(2025, 1), Period::new(2025, 2))
        .unwrap();
    assert_eq!(comparison.income_change, dec(2000));
    assert_eq!(comparison.income_change_percent, Decimal::ZERO);
    assert_eq!(comparison.expense_change, dec(50));
    assert_eq!(comparison.expense_change_percent, dec(50));
}

#[test]
fn projection_averages_the_three_prior_months() {
    let (manager, _, _) = setup_test_env(date(2025, 5, 20));
    for month in 2..=4 {
        manager
            .add_transaction(Transaction::income(dec(3000), "salary", date(2025, month, 1)))
            .unwrap();
        manager
            .add_transaction(Transaction::expense(dec(2100), "housing", date(2025, month, 2)))
            .unwrap();
    }
    // Ignored by the averaging window.
    manager
        .add_transaction(Transaction::expense(dec(600), "travel", date(2025, 5, 3)))
        .unwrap();
    manager
        .add_transaction(Transaction::income(dec(9000), "gifts", date(2025, 1, 3)))
        .unwrap();

    let projection = manager.financial_projection(6).unwrap();
    assert_eq!(projection.average_income, dec(3000));
    assert_eq!(projection.average_expenses, dec(2100));
    assert_eq!(projection.current_balance, dec(11100));
    assert_eq!(projection.points.len(), 6);
    assert_eq!(projection.points[0].projected_balance, dec(12000));
    assert_eq!(projection.points[5].projected_balance, dec(16500));
    assert_eq!((projection.points[0].year, projection.points[0].month), (2025, 6));
    assert_eq!((projection.points[5].year, projection.points[5].month), (2025, 11));
}

#[test]
fn category_analysis_and_insights_share_problem_categories() {
    let (manager, _, _) = setup_test_env(date(2025, 5, 20));
    manager
        .add_transaction(Transaction::income(dec(1000), "salary", date(2025, 5, 1)))
        .unwrap();
    for (category, amount) in [("food", 100), ("transport", 100), ("housing", 1200)] {
        manager
            .add_transaction(Transaction::expense(dec(amount), category, date(2025, 5, 2)))
            .unwrap();
    }
    let analysis = manager.category_analysis();
    assert_eq!(analysis.categories[0].category, "housing");
    assert_eq!(analysis.problem_categories, vec!["housing".to_string()]);

    let insights = manager.insights().unwrap();
    assert_eq!(insights.len(), 3);
    assert!(insights[1].message.contains("housing"));
    // Insights are recomputed, never stored.
    assert_eq!(manager.insights().unwrap(), insights);
    assert!(manager.alerts().is_empty());
}
