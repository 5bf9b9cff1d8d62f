//! Base directory handling for the file-based storage backend.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::storage::csv::{
    AdjustmentRepository, PlannedExpenseRepository, RecurringRepository, SettingsRepository,
};
use crate::storage::traits::Connection;

/// Handle on a data directory holding one subdirectory per user.
///
/// Layout:
/// ```text
/// data/
/// └── {user_id}/
///     ├── settings.yaml
///     ├── recurring_items.csv
///     ├── planned_expenses.csv
///     └── adjustments.csv
/// ```
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new connection rooted at the given data directory,
    /// creating the directory if needed.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_directory)?;
        debug!("CSV storage rooted at {:?}", base_directory);
        Ok(Self { base_directory })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Directory holding one user's files. Not created until a write needs it.
    pub fn get_user_directory(&self, user_id: &str) -> PathBuf {
        self.base_directory.join(safe_directory_name(user_id))
    }

    /// Ensure the user's directory exists, returning its path.
    pub fn ensure_user_directory(&self, user_id: &str) -> Result<PathBuf> {
        let user_dir = self.get_user_directory(user_id);
        if !user_dir.exists() {
            std::fs::create_dir_all(&user_dir)?;
            debug!("Created user directory {:?}", user_dir);
        }
        Ok(user_dir)
    }
}

/// Reduce a user ID to a filesystem-safe directory name.
fn safe_directory_name(user_id: &str) -> String {
    user_id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase()
}

impl Connection for CsvConnection {
    type SettingsRepository = SettingsRepository;
    type RecurringItemRepository = RecurringRepository;
    type PlannedExpenseRepository = PlannedExpenseRepository;
    type AdjustmentRepository = AdjustmentRepository;

    fn create_settings_repository(&self) -> Self::SettingsRepository {
        SettingsRepository::new(self.clone())
    }

    fn create_recurring_item_repository(&self) -> Self::RecurringItemRepository {
        RecurringRepository::new(self.clone())
    }

    fn create_planned_expense_repository(&self) -> Self::PlannedExpenseRepository {
        PlannedExpenseRepository::new(self.clone())
    }

    fn create_adjustment_repository(&self) -> Self::AdjustmentRepository {
        AdjustmentRepository::new(self.clone())
    }
}
