//! Background re-check of alert conditions on a fixed interval.

use std::sync::{
    mpsc::{self, RecvTimeoutError, Sender},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use uuid::Uuid;

use super::ledger_manager::LedgerManager;
use crate::errors::Result;

/// Handle to a running monitor thread. Dropping it stops the thread.
pub struct AlertMonitor {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AlertMonitor {
    pub fn spawn(manager: Arc<LedgerManager>, user_id: Uuid, interval: Duration) -> Result<Self> {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("finance-alert-monitor".into())
            .spawn(move || {
                tracing::debug!(%user_id, ?interval, "alert monitor started");
                loop {
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if let Err(err) = manager.run_alert_checks(user_id) {
                                tracing::warn!(%err, "periodic alert check failed");
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!(%user_id, "alert monitor stopped");
            })?;
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Uses the interval from the manager's alert settings.
    pub fn from_settings(manager: Arc<LedgerManager>, user_id: Uuid) -> Result<Self> {
        let interval = Duration::from_secs(manager.config().alerts.check_interval_secs.max(1));
        Self::spawn(manager, user_id, interval)
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signals the thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("alert monitor thread panicked");
            }
        }
    }
}

impl Drop for AlertMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::ledger::{Budget, BudgetPeriod, Transaction};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn monitor_raises_alerts_until_stopped() {
        let clock = Arc::new(FixedClock::at_date(
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        ));
        let manager = Arc::new(LedgerManager::in_memory(clock));
        manager
            .add_budget(Budget::new("food", Decimal::from(100), BudgetPeriod::Monthly))
            .unwrap();
        manager
            .add_transaction(Transaction::expense(
                Decimal::from(150),
                "food",
                NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            ))
            .unwrap();

        let user = Uuid::new_v4();
        let monitor =
            AlertMonitor::spawn(Arc::clone(&manager), user, Duration::from_millis(10)).unwrap();
        assert!(monitor.is_running());
        thread::sleep(Duration::from_millis(100));
        monitor.stop();

        let raised = manager.alerts().len();
        assert!(raised >= 1, "expected periodic alerts, got {raised}");
        thread::sleep(Duration::from_millis(50));
        assert_eq!(manager.alerts().len(), raised);
    }
}
