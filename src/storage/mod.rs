pub mod json_backend;

use std::{path::PathBuf, sync::Mutex};

use crate::{
    errors::{FinanceError, Result},
    ledger::Ledger,
};

/// Abstraction over the single persisted finance state document.
pub trait StateStorage: Send + Sync {
    /// Returns `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Ledger>>;
    fn save(&self, ledger: &Ledger) -> Result<()>;

    /// Backends without durable files report backups as unsupported.
    fn backup(&self, _note: Option<&str>) -> Result<PathBuf> {
        Err(FinanceError::Persistence(
            "backups are not supported by this storage".into(),
        ))
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        Ok(Vec::new())
    }

    fn restore_backup(&self, name: &str) -> Result<Ledger> {
        Err(FinanceError::Persistence(format!(
            "cannot restore `{}`: backups are not supported by this storage",
            name
        )))
    }
}

/// Keeps the serialized state in memory. Useful for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the storage with an existing state.
    pub fn with_ledger(ledger: &Ledger) -> Result<Self> {
        let storage = Self::new();
        storage.save(ledger)?;
        Ok(storage)
    }

    pub fn raw(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Ledger>> {
        match self.raw() {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let data = serde_json::to_string(ledger)?;
        *self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(data);
        Ok(())
    }
}

pub use json_backend::{BackupInfo, JsonStorage, STATE_KEY};
