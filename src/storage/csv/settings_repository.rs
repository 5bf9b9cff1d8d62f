//! # Settings Repository
//!
//! Per-user budget settings stored as a single YAML file,
//! `{user_directory}/settings.yaml`. Writes are atomic: the file is written
//! to a temp path and renamed into place.

use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::UserSettings;
use crate::storage::traits::SettingsStorage;

/// YAML-file-backed settings repository.
#[derive(Clone)]
pub struct SettingsRepository {
    connection: CsvConnection,
}

impl SettingsRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn get_settings_path(&self, user_id: &str) -> PathBuf {
        self.connection.get_user_directory(user_id).join("settings.yaml")
    }
}

impl SettingsStorage for SettingsRepository {
    fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>> {
        let yaml_path = self.get_settings_path(user_id);

        if !yaml_path.exists() {
            debug!("No settings file for user '{}'", user_id);
            return Ok(None);
        }

        let yaml_content = std::fs::read_to_string(&yaml_path)?;
        let settings: UserSettings = serde_yaml::from_str(&yaml_content)?;

        debug!("Loaded settings for user '{}' from {:?}", user_id, yaml_path);
        Ok(Some(settings))
    }

    fn store_settings(&self, settings: &UserSettings) -> Result<()> {
        self.connection.ensure_user_directory(&settings.user_id)?;

        let yaml_path = self.get_settings_path(&settings.user_id);
        let yaml_content = serde_yaml::to_string(settings)?;

        let temp_path = yaml_path.with_extension("tmp");
        std::fs::write(&temp_path, yaml_content)?;
        std::fs::rename(&temp_path, &yaml_path)?;

        debug!("Saved settings for user '{}' to {:?}", settings.user_id, yaml_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (SettingsRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        (SettingsRepository::new(connection), temp_dir)
    }

    fn test_settings(user_id: &str) -> UserSettings {
        UserSettings {
            user_id: user_id.to_string(),
            initial_balance: 1000.0,
            margin_pct: 10.0,
            month_start_day: 1,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_get_settings_missing_user() {
        let (repo, _temp_dir) = setup();
        assert!(repo.get_settings("ghost").unwrap().is_none());
    }

    #[test]
    fn test_store_and_get_settings() {
        let (repo, _temp_dir) = setup();
        let settings = test_settings("user::1");

        repo.store_settings(&settings).expect("Failed to store settings");

        let loaded = repo
            .get_settings("user::1")
            .expect("Failed to load settings")
            .expect("Settings should exist");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_store_replaces_existing() {
        let (repo, _temp_dir) = setup();
        let mut settings = test_settings("user::1");
        repo.store_settings(&settings).unwrap();

        settings.initial_balance = 2500.0;
        settings.margin_pct = 5.0;
        repo.store_settings(&settings).unwrap();

        let loaded = repo.get_settings("user::1").unwrap().unwrap();
        assert_eq!(loaded.initial_balance, 2500.0);
        assert_eq!(loaded.margin_pct, 5.0);
    }
}
