use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::categories::CategoryList;
use crate::timer::DEFAULT_DURATION_SECS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSettings {
    pub default_duration_secs: u64,
    pub categories: CategoryList,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            default_duration_secs: DEFAULT_DURATION_SECS,
            categories: CategoryList::default(),
        }
    }
}

/// `settings.json` in the data directory. A missing or unreadable file means defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> UserSettings {
        self.read().clone()
    }

    pub fn default_duration_secs(&self) -> u64 {
        self.read().default_duration_secs
    }

    pub fn categories(&self) -> CategoryList {
        self.read().categories.clone()
    }

    pub fn update_default_duration(&self, duration_secs: u64) -> Result<()> {
        if duration_secs == 0 {
            bail!("default duration must be greater than zero");
        }
        let mut guard = self.write();
        guard.default_duration_secs = duration_secs;
        self.persist(&guard)
    }

    /// Applies `change` to the category list and persists the result when it succeeds.
    pub fn update_categories<T, E>(
        &self,
        change: impl FnOnce(&mut CategoryList) -> std::result::Result<T, E>,
    ) -> Result<T>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut guard = self.write();
        let mut categories = guard.categories.clone();
        let value = change(&mut categories)?;
        guard.categories = categories;
        self.persist(&guard)?;
        Ok(value)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::CategoryError;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();

        assert_eq!(store.snapshot(), UserSettings::default());
        assert_eq!(store.default_duration_secs(), 1500);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ nope").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.snapshot(), UserSettings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"defaultDurationSecs": 3000}"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.default_duration_secs(), 3000);
        assert_eq!(store.categories(), CategoryList::default());
    }

    #[test]
    fn category_list_without_selection_keeps_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"defaultDurationSecs": 3000, "categories": {"categories": ["Art", "Music"]}}"#,
        )
        .unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.default_duration_secs(), 3000);
        assert_eq!(store.categories().names(), ["Art", "Music"]);
        assert_eq!(store.categories().selected(), "Art");
    }

    #[test]
    fn updates_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        store.update_default_duration(600).unwrap();
        let added = store
            .update_categories(|list| list.add("Writing").map(str::to_string))
            .unwrap();
        assert_eq!(added, "Writing");

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.default_duration_secs(), 600);
        assert_eq!(reopened.categories().selected(), "Writing");
    }

    #[test]
    fn failed_category_change_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let err = store
            .update_categories(|list| list.add("coding").map(str::to_string))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<CategoryError>(),
            Some(&CategoryError::Duplicate("Coding".into()))
        );
        assert!(!path.exists());
        assert!(store.update_default_duration(0).is_err());
    }
}
