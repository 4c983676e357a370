#![doc(test(attr(deny(warnings))))]

//! Finance Core owns a personal finance ledger (transactions, budgets, goals,
//! recurring rules, alerts) and derives balances, reports, projections, and
//! insights from it on demand.

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod session;
pub mod storage;
pub mod utils;

pub use crate::core::alert_monitor::AlertMonitor;
pub use crate::core::ledger_manager::LedgerManager;
pub use crate::core::time::{Clock, FixedClock, SystemClock};
pub use session::{Feature, Plan, Session};
pub use errors::{FinanceError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
