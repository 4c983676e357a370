use chrono::{DateTime, Utc};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    errors::{FinanceError, Result},
    ledger::Ledger,
    utils::persistence::{
        ensure_dir, parse_backup_name, sanitize_note, write_atomic, BACKUP_TIMESTAMP_FORMAT,
        JSON_EXTENSION,
    },
};

use super::StateStorage;

/// Fixed key under which the finance state is stored.
pub const STATE_KEY: &str = "finance_state";
const BACKUP_DIR: &str = "backups";
const DEFAULT_RETENTION: usize = 5;

/// Stores the finance state as `<root>/finance_state.json` with rolling backups.
///
/// Every save first copies the previous state into an unnamed backup. Only
/// unnamed backups count against `retention`; backups taken with a note are
/// kept until removed by hand.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    state_file: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub created_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl JsonStorage {
    pub fn new(root: PathBuf, retention: Option<usize>) -> Result<Self> {
        let backups_dir = root.join(BACKUP_DIR);
        ensure_dir(&root)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            state_file: root.join(format!("{}.{}", STATE_KEY, JSON_EXTENSION)),
            backups_dir,
            root,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> &Path {
        &self.state_file
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Copies the current state file into the backup folder.
    pub fn backup(&self, note: Option<&str>) -> Result<PathBuf> {
        if !self.state_file.exists() {
            return Err(FinanceError::Persistence(
                "no saved state to back up".into(),
            ));
        }
        let path = self.backup_target(note);
        fs::copy(&self.state_file, &path)?;
        tracing::debug!(path = %path.display(), "state backup created");
        self.prune_backups()?;
        Ok(path)
    }

    /// Backups sorted newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            let name = match path.file_name().and_then(|name| name.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            let (created_at, note) = match parse_backup_name(&name) {
                Some((created_at, note)) => (Some(created_at), note),
                None => (None, None),
            };
            entries.push(BackupInfo {
                created_at,
                note,
                name,
                path,
            });
        }
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(entries)
    }

    /// Replaces the live state with the named backup and returns it.
    pub fn restore_backup(&self, name: &str) -> Result<Ledger> {
        let backup_path = self.backups_dir.join(name);
        if !backup_path.exists() {
            return Err(FinanceError::Persistence(format!(
                "backup `{}` not found",
                name
            )));
        }
        let data = fs::read_to_string(&backup_path)?;
        let ledger: Ledger = serde_json::from_str(&data)?;
        write_atomic(&self.state_file, &data)?;
        tracing::info!(backup = name, "state restored from backup");
        Ok(ledger)
    }

    fn backup_target(&self, note: Option<&str>) -> PathBuf {
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut file_stem = format!("{}_{}", STATE_KEY, timestamp);
        if let Some(label) = sanitize_note(note) {
            file_stem.push('_');
            file_stem.push_str(&label);
        }
        self.backups_dir
            .join(format!("{}.{}", file_stem, JSON_EXTENSION))
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        let unnamed = backups.iter().filter(|entry| entry.note.is_none());
        for entry in unnamed.skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                tracing::warn!(path = %entry.path.display(), %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StateStorage for JsonStorage {
    fn load(&self) -> Result<Option<Ledger>> {
        if !self.state_file.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.state_file)?;
        let ledger: Ledger = serde_json::from_str(&data)?;
        tracing::debug!(path = %self.state_file.display(), "state loaded");
        Ok(Some(ledger))
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        if self.state_file.exists() {
            self.backup(None)?;
        }
        let json = serde_json::to_string_pretty(ledger)?;
        write_atomic(&self.state_file, &json)?;
        tracing::debug!(path = %self.state_file.display(), "state saved");
        Ok(())
    }

    fn backup(&self, note: Option<&str>) -> Result<PathBuf> {
        JsonStorage::backup(self, note)
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        JsonStorage::list_backups(self)
    }

    fn restore_backup(&self, name: &str) -> Result<Ledger> {
        JsonStorage::restore_backup(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Transaction;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn sample() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.transactions.push(Transaction::expense(
            Decimal::new(4250, 2),
            "food",
            NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
        ));
        ledger
    }

    #[test]
    fn save_writes_state_file_under_fixed_key() {
        let temp = tempdir().unwrap();
        let storage = JsonStorage::new(temp.path().to_path_buf(), None).unwrap();
        assert!(storage.load().unwrap().is_none());

        storage.save(&sample()).unwrap();
        assert!(temp.path().join("finance_state.json").exists());
        assert!(!temp.path().join("finance_state.json.tmp").exists());
        assert_eq!(storage.load().unwrap().unwrap().transactions.len(), 1);
    }

    #[test]
    fn backups_use_timestamped_names_and_respect_retention() {
        let temp = tempdir().unwrap();
        let storage = JsonStorage::new(temp.path().to_path_buf(), Some(2)).unwrap();
        storage.save(&sample()).unwrap();

        for _ in 0..4 {
            storage.backup(None).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let backups = storage.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        for backup in &backups {
            assert!(backup.name.starts_with("finance_state_"));
            assert!(backup.created_at.is_some());
            assert!(backup.note.is_none());
        }
    }

    #[test]
    fn noted_backups_outlive_automatic_rotation() {
        let temp = tempdir().unwrap();
        let storage = JsonStorage::new(temp.path().to_path_buf(), Some(2)).unwrap();
        storage.save(&sample()).unwrap();
        let kept = storage.backup(Some("before import")).unwrap();

        for _ in 0..6 {
            std::thread::sleep(std::time::Duration::from_millis(5));
            storage.save(&sample()).unwrap();
        }
        assert!(kept.exists());
        let backups = storage.list_backups().unwrap();
        let unnamed = backups.iter().filter(|backup| backup.note.is_none()).count();
        assert_eq!(unnamed, 2);
        assert!(backups
            .iter()
            .any(|backup| backup.note.as_deref() == Some("before-import")));
    }

    #[test]
    fn backup_without_state_fails() {
        let temp = tempdir().unwrap();
        let storage = JsonStorage::new(temp.path().to_path_buf(), None).unwrap();
        assert!(matches!(
            storage.backup(None),
            Err(FinanceError::Persistence(_))
        ));
    }

    #[test]
    fn restore_replaces_live_state() {
        let temp = tempdir().unwrap();
        let storage = JsonStorage::new(temp.path().to_path_buf(), None).unwrap();
        storage.save(&sample()).unwrap();
        let backup = storage.backup(Some("before cleanup")).unwrap();
        let backup_name = backup.file_name().unwrap().to_str().unwrap().to_string();
        assert!(backup_name.contains("before-cleanup"));

        storage.save(&Ledger::new()).unwrap();
        assert!(storage.load().unwrap().unwrap().transactions.is_empty());

        let restored = storage.restore_backup(&backup_name).unwrap();
        assert_eq!(restored.transactions.len(), 1);
        assert_eq!(storage.load().unwrap().unwrap().transactions.len(), 1);
    }
}
