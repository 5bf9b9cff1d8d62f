//! # Recurring Item Repository
//!
//! Per-user recurring incomes and expenses stored in
//! `{user_directory}/recurring_items.csv`. The frequency payload is kept as
//! tagged JSON in one column so one-time, monthly, quarterly and yearly
//! shapes share a file.
//!
//! ## CSV Format
//!
//! ```csv
//! id,user_id,kind,label,category,amount,day_of_month,frequency,created_at,updated_at
//! income::3f2a...,user::1,income,"Salary","work",2000.0,1,"{""kind"":""monthly""}",2025-01-01T00:00:00Z,2025-01-01T00:00:00Z
//! ```

use anyhow::Result;
use csv::{Reader, Writer};
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::{Frequency, RecurringItem, RecurringKind};
use crate::storage::traits::RecurringItemStorage;

const HEADER: &str = "id,user_id,kind,label,category,amount,day_of_month,frequency,created_at,updated_at\n";

/// CSV record structure for recurring items
#[derive(Debug, Clone)]
struct RecurringRecord {
    id: String,
    user_id: String,
    kind: String,
    label: String,
    category: String,
    amount: f64,
    day_of_month: u32,
    frequency: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<RecurringItem> for RecurringRecord {
    type Error = anyhow::Error;

    fn try_from(item: RecurringItem) -> Result<Self> {
        let frequency = serde_json::to_string(&item.frequency)?;
        Ok(RecurringRecord {
            id: item.id,
            user_id: item.user_id,
            kind: item.kind.as_str().to_string(),
            label: item.label,
            category: item.category,
            amount: item.amount,
            day_of_month: item.day_of_month,
            frequency,
            created_at: item.created_at,
            updated_at: item.updated_at,
        })
    }
}

impl TryFrom<RecurringRecord> for RecurringItem {
    type Error = anyhow::Error;

    fn try_from(record: RecurringRecord) -> Result<Self> {
        let kind = RecurringKind::from_string(&record.kind)
            .map_err(|e| anyhow::anyhow!("Failed to parse recurring kind: {}", e))?;
        let frequency: Frequency = serde_json::from_str(&record.frequency)?;

        Ok(RecurringItem {
            id: record.id,
            user_id: record.user_id,
            kind,
            label: record.label,
            category: record.category,
            amount: record.amount,
            day_of_month: record.day_of_month,
            frequency,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// CSV-based recurring item repository using per-user files
#[derive(Clone)]
pub struct RecurringRepository {
    connection: CsvConnection,
}

impl RecurringRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn get_items_file_path(&self, user_id: &str) -> PathBuf {
        self.connection
            .get_user_directory(user_id)
            .join("recurring_items.csv")
    }

    fn ensure_items_file_exists(&self, user_id: &str) -> Result<()> {
        self.connection.ensure_user_directory(user_id)?;
        let file_path = self.get_items_file_path(user_id);
        if !file_path.exists() {
            std::fs::write(&file_path, HEADER)?;
            debug!("Created recurring items CSV file: {:?}", file_path);
        }
        Ok(())
    }

    /// Read all recurring items for a user from their CSV file
    fn read_items(&self, user_id: &str) -> Result<Vec<RecurringItem>> {
        self.ensure_items_file_exists(user_id)?;

        let file = File::open(self.get_items_file_path(user_id))?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut items = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let recurring_record = RecurringRecord {
                id: record.get(0).unwrap_or("").to_string(),
                user_id: record.get(1).unwrap_or("").to_string(),
                kind: record.get(2).unwrap_or("").to_string(),
                label: record.get(3).unwrap_or("").to_string(),
                category: record.get(4).unwrap_or("").to_string(),
                amount: record.get(5).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                day_of_month: record.get(6).unwrap_or("1").parse::<u32>().unwrap_or(1),
                frequency: record.get(7).unwrap_or("").to_string(),
                created_at: record.get(8).unwrap_or("").to_string(),
                updated_at: record.get(9).unwrap_or("").to_string(),
            };

            match RecurringItem::try_from(recurring_record) {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!("Failed to parse recurring item record: {}. Skipping.", e);
                    continue;
                }
            }
        }

        Ok(items)
    }

    /// Write all recurring items for a user to their CSV file (atomic)
    fn write_items(&self, user_id: &str, items: &[RecurringItem]) -> Result<()> {
        self.connection.ensure_user_directory(user_id)?;
        let file_path = self.get_items_file_path(user_id);
        let temp_file_path = file_path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_file_path)?;
            let writer = BufWriter::new(temp_file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record([
                "id",
                "user_id",
                "kind",
                "label",
                "category",
                "amount",
                "day_of_month",
                "frequency",
                "created_at",
                "updated_at",
            ])?;

            for item in items {
                let record = RecurringRecord::try_from(item.clone())?;
                csv_writer.write_record([
                    &record.id,
                    &record.user_id,
                    &record.kind,
                    &record.label,
                    &record.category,
                    &record.amount.to_string(),
                    &record.day_of_month.to_string(),
                    &record.frequency,
                    &record.created_at,
                    &record.updated_at,
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_file_path, &file_path)?;
        debug!("Wrote {} recurring items to {:?}", items.len(), file_path);
        Ok(())
    }
}

impl RecurringItemStorage for RecurringRepository {
    fn store_item(&self, item: &RecurringItem) -> Result<()> {
        self.ensure_items_file_exists(&item.user_id)?;

        let file = OpenOptions::new()
            .append(true)
            .open(self.get_items_file_path(&item.user_id))?;
        let mut csv_writer = Writer::from_writer(file);

        let record = RecurringRecord::try_from(item.clone())?;
        csv_writer.write_record([
            &record.id,
            &record.user_id,
            &record.kind,
            &record.label,
            &record.category,
            &record.amount.to_string(),
            &record.day_of_month.to_string(),
            &record.frequency,
            &record.created_at,
            &record.updated_at,
        ])?;
        csv_writer.flush()?;

        debug!("Appended recurring item {} for user {}", item.id, item.user_id);
        Ok(())
    }

    fn get_item(&self, user_id: &str, item_id: &str) -> Result<Option<RecurringItem>> {
        let items = self.read_items(user_id)?;
        Ok(items.into_iter().find(|item| item.id == item_id))
    }

    fn list_items(&self, user_id: &str, kind: RecurringKind) -> Result<Vec<RecurringItem>> {
        let items = self.read_items(user_id)?;
        Ok(items.into_iter().filter(|item| item.kind == kind).collect())
    }

    fn update_item(&self, item: &RecurringItem) -> Result<()> {
        let mut items = self.read_items(&item.user_id)?;

        let position = items.iter().position(|existing| existing.id == item.id);
        match position {
            Some(index) => {
                items[index] = item.clone();
                self.write_items(&item.user_id, &items)
            }
            None => Err(anyhow::anyhow!("Recurring item not found: {}", item.id)),
        }
    }

    fn delete_item(&self, user_id: &str, item_id: &str) -> Result<bool> {
        let mut items = self.read_items(user_id)?;
        let initial_len = items.len();
        items.retain(|item| item.id != item_id);

        if items.len() == initial_len {
            return Ok(false);
        }

        self.write_items(user_id, &items)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup() -> (RecurringRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        (RecurringRepository::new(connection), temp_dir)
    }

    fn test_item(id: &str, kind: RecurringKind, frequency: Frequency) -> RecurringItem {
        RecurringItem {
            id: id.to_string(),
            user_id: "user::1".to_string(),
            kind,
            label: "Test item".to_string(),
            category: "misc".to_string(),
            amount: 100.0,
            day_of_month: 15,
            frequency,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_store_and_list_filters_by_kind() {
        let (repo, _temp_dir) = setup();

        repo.store_item(&test_item("income::1", RecurringKind::Income, Frequency::Monthly))
            .unwrap();
        repo.store_item(&test_item("expense::1", RecurringKind::Expense, Frequency::Monthly))
            .unwrap();
        repo.store_item(&test_item(
            "income::2",
            RecurringKind::Income,
            Frequency::Quarterly { months: None },
        ))
        .unwrap();

        let incomes = repo.list_items("user::1", RecurringKind::Income).unwrap();
        assert_eq!(incomes.len(), 2);
        // Stored order is preserved.
        assert_eq!(incomes[0].id, "income::1");
        assert_eq!(incomes[1].id, "income::2");

        let expenses = repo.list_items("user::1", RecurringKind::Expense).unwrap();
        assert_eq!(expenses.len(), 1);
    }

    #[test]
    fn test_frequency_payload_round_trips() {
        let (repo, _temp_dir) = setup();

        let frequency = Frequency::OneTime {
            date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
        };
        repo.store_item(&test_item("income::1", RecurringKind::Income, frequency.clone()))
            .unwrap();

        let loaded = repo.get_item("user::1", "income::1").unwrap().unwrap();
        assert_eq!(loaded.frequency, frequency);

        let frequency = Frequency::Yearly {
            months: Some(vec![3, 9]),
        };
        repo.store_item(&test_item("income::2", RecurringKind::Income, frequency.clone()))
            .unwrap();

        let loaded = repo.get_item("user::1", "income::2").unwrap().unwrap();
        assert_eq!(loaded.frequency, frequency);
    }

    #[test]
    fn test_update_item() {
        let (repo, _temp_dir) = setup();

        let mut item = test_item("income::1", RecurringKind::Income, Frequency::Monthly);
        repo.store_item(&item).unwrap();

        item.amount = 250.0;
        item.day_of_month = 28;
        repo.update_item(&item).unwrap();

        let loaded = repo.get_item("user::1", "income::1").unwrap().unwrap();
        assert_eq!(loaded.amount, 250.0);
        assert_eq!(loaded.day_of_month, 28);
    }

    #[test]
    fn test_update_missing_item_fails() {
        let (repo, _temp_dir) = setup();
        let item = test_item("income::missing", RecurringKind::Income, Frequency::Monthly);
        assert!(repo.update_item(&item).is_err());
    }

    #[test]
    fn test_delete_item() {
        let (repo, _temp_dir) = setup();

        let item = test_item("income::1", RecurringKind::Income, Frequency::Monthly);
        repo.store_item(&item).unwrap();

        assert!(repo.delete_item("user::1", "income::1").unwrap());
        assert!(!repo.delete_item("user::1", "income::1").unwrap());
        assert!(repo.get_item("user::1", "income::1").unwrap().is_none());
    }
}
