//! # Adjustment Repository
//!
//! Per-user balance adjustment ledger stored in
//! `{user_directory}/adjustments.csv`. The ledger is append-only; rows are
//! never rewritten. Listing returns entries newest first.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::{AdjustmentKind, BalanceAdjustment};
use crate::storage::traits::AdjustmentStorage;

const HEADER: &str = "id,user_id,amount,description,kind,created_at\n";

/// CSV-based adjustment ledger using per-user files
#[derive(Clone)]
pub struct AdjustmentRepository {
    connection: CsvConnection,
}

impl AdjustmentRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn get_adjustments_file_path(&self, user_id: &str) -> PathBuf {
        self.connection
            .get_user_directory(user_id)
            .join("adjustments.csv")
    }

    fn ensure_adjustments_file_exists(&self, user_id: &str) -> Result<()> {
        self.connection.ensure_user_directory(user_id)?;
        let file_path = self.get_adjustments_file_path(user_id);
        if !file_path.exists() {
            std::fs::write(&file_path, HEADER)?;
            debug!("Created adjustments CSV file: {:?}", file_path);
        }
        Ok(())
    }

    fn read_adjustments(&self, user_id: &str) -> Result<Vec<BalanceAdjustment>> {
        self.ensure_adjustments_file_exists(user_id)?;

        let file = File::open(self.get_adjustments_file_path(user_id))?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut adjustments = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let kind_str = record.get(4).unwrap_or("");
            let kind = match AdjustmentKind::from_string(kind_str) {
                Ok(kind) => kind,
                Err(e) => {
                    warn!("Failed to parse adjustment kind: {}. Skipping.", e);
                    continue;
                }
            };

            let created_at_str = record.get(5).unwrap_or("");
            let created_at = match DateTime::parse_from_rfc3339(created_at_str) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(e) => {
                    warn!(
                        "Failed to parse adjustment timestamp '{}': {}. Skipping.",
                        created_at_str, e
                    );
                    continue;
                }
            };

            adjustments.push(BalanceAdjustment {
                id: record.get(0).unwrap_or("").to_string(),
                user_id: record.get(1).unwrap_or("").to_string(),
                amount: record.get(2).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                description: record.get(3).unwrap_or("").to_string(),
                kind,
                created_at,
            });
        }

        Ok(adjustments)
    }
}

impl AdjustmentStorage for AdjustmentRepository {
    fn insert_adjustment(&self, adjustment: &BalanceAdjustment) -> Result<()> {
        self.ensure_adjustments_file_exists(&adjustment.user_id)?;

        let file = OpenOptions::new()
            .append(true)
            .open(self.get_adjustments_file_path(&adjustment.user_id))?;
        let mut csv_writer = Writer::from_writer(file);

        let amount = adjustment.amount.to_string();
        let created_at = adjustment.created_at.to_rfc3339();
        csv_writer.write_record([
            adjustment.id.as_str(),
            adjustment.user_id.as_str(),
            amount.as_str(),
            adjustment.description.as_str(),
            adjustment.kind.as_str(),
            created_at.as_str(),
        ])?;
        csv_writer.flush()?;

        debug!(
            "Appended adjustment {} ({}) for user {}",
            adjustment.id,
            adjustment.kind.as_str(),
            adjustment.user_id
        );
        Ok(())
    }

    fn list_adjustments(&self, user_id: &str) -> Result<Vec<BalanceAdjustment>> {
        let mut adjustments = self.read_adjustments(user_id)?;
        // Newest first; equal timestamps keep insertion order reversed last.
        adjustments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(adjustments)
    }
}
