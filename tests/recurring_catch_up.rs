mod common;

use common::{date, setup_test_env};
use finance_core::ledger::{Frequency, RecurringPatch, RecurringRule, TransactionKind};
use rust_decimal::Decimal;
use uuid::Uuid;

fn rent(start: chrono::NaiveDate) -> RecurringRule {
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
fn one_missed_period_is_caught_up_per_call() {
    let (manager, _, _) = setup_test_env(date(2025, 3, 15));
    let id = manager.add_recurring(rent(date(2025, 1, 15))).unwrap();

    let first = manager.process_recurring().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].date, date(2025, 1, 15));
    let rule = manager
        .recurring_rules()
        .into_iter()
        .find(|rule| rule.id == id)
        .unwrap();
    assert_eq!(rule.next_due_date, date(2025, 2, 15));

    assert_eq!(manager.process_recurring().unwrap()[0].date, date(2025, 2, 15));
    assert_eq!(manager.process_recurring().unwrap()[0].date, date(2025, 3, 15));
    assert!(manager.process_recurring().unwrap().is_empty());
    assert_eq!(manager.transactions().len(), 3);
    assert_eq!(manager.total_expenses(), Decimal::from(3600));
}

#[test]
fn month_end_rules_clamp_without_drift_correction() {
    let (manager, _, clock) = setup_test_env(date(2025, 1, 31));
    manager.add_recurring(rent(date(2025, 1, 31))).unwrap();
    assert_eq!(manager.process_recurring().unwrap()[0].date, date(2025, 1, 31));

    clock.set_date(date(2025, 3, 31));
    assert_eq!(manager.process_recurring().unwrap()[0].date, date(2025, 2, 28));
    assert_eq!(manager.process_recurring().unwrap()[0].date, date(2025, 3, 28));
}

#[test]
fn toggled_and_ended_rules_stop_materializing() {
    let (manager, _, clock) = setup_test_env(date(2025, 1, 1));
    let id = manager.add_recurring(rent(date(2025, 1, 1))).unwrap();
    assert!(!manager.toggle_recurring(id).unwrap());
    assert!(manager.process_recurring().unwrap().is_empty());

    assert!(manager.toggle_recurring(id).unwrap());
    manager
        .update_recurring(
            id,
            RecurringPatch {
                end_date: Some(Some(date(2025, 1, 31))),
                ..RecurringPatch::default()
            },
        )
        .unwrap();
    assert_eq!(manager.process_recurring().unwrap().len(), 1);

    clock.set_date(date(2025, 2, 1));
    assert!(manager.process_recurring().unwrap().is_empty());

    manager.delete_recurring(id).unwrap();
    assert!(manager.recurring_rules().is_empty());
}
