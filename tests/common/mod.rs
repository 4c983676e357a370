#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use finance_core::{
    config::{Config, ConfigManager},
    core::{ledger_manager::LedgerManager, time::FixedClock},
    storage::json_backend::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn fixed_clock(today: NaiveDate) -> Arc<FixedClock> {
    Arc::new(FixedClock::at_date(today))
}

/// Opens a JSON-backed manager in `base` with the given config.
pub fn open_manager(base: &PathBuf, config: Config, clock: Arc<FixedClock>) -> LedgerManager {
    let storage = JsonStorage::new(config.resolve_data_root(base), Some(config.backup_retention))
        .expect("create json storage backend");
    LedgerManager::open(Box::new(storage), clock, config).expect("open ledger manager")
}

/// Creates an isolated manager and config manager backed by a unique directory.
pub fn setup_test_env(today: NaiveDate) -> (LedgerManager, ConfigManager, Arc<FixedClock>) {
    let base = temp_base();
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    let config = config_manager.load().expect("load default config");
    let clock = fixed_clock(today);
    let manager = open_manager(&base, config, Arc::clone(&clock));
    (manager, config_manager, clock)
}
