//! # Planned Expense Repository
//!
//! Per-user one-off planned expenses stored in
//! `{user_directory}/planned_expenses.csv`. Dates are stored as plain
//! `YYYY-MM-DD`; planned expenses have no time component.

use anyhow::Result;
use chrono::NaiveDate;
use csv::{Reader, Writer};
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::PlannedExpense;
use crate::storage::traits::PlannedExpenseStorage;

const HEADER: &str = "id,user_id,label,category,amount,date,spent,created_at\n";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// CSV-based planned expense repository using per-user files
#[derive(Clone)]
pub struct PlannedExpenseRepository {
    connection: CsvConnection,
}

impl PlannedExpenseRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn get_expenses_file_path(&self, user_id: &str) -> PathBuf {
        self.connection
            .get_user_directory(user_id)
            .join("planned_expenses.csv")
    }

    fn ensure_expenses_file_exists(&self, user_id: &str) -> Result<()> {
        self.connection.ensure_user_directory(user_id)?;
        let file_path = self.get_expenses_file_path(user_id);
        if !file_path.exists() {
            std::fs::write(&file_path, HEADER)?;
            debug!("Created planned expenses CSV file: {:?}", file_path);
        }
        Ok(())
    }

    fn read_expenses(&self, user_id: &str) -> Result<Vec<PlannedExpense>> {
        self.ensure_expenses_file_exists(user_id)?;

        let file = File::open(self.get_expenses_file_path(user_id))?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut expenses = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let date_str = record.get(5).unwrap_or("");
            let date = match NaiveDate::parse_from_str(date_str, DATE_FORMAT) {
                Ok(date) => date,
                Err(e) => {
                    warn!("Failed to parse planned expense date '{}': {}. Skipping.", date_str, e);
                    continue;
                }
            };

            expenses.push(PlannedExpense {
                id: record.get(0).unwrap_or("").to_string(),
                user_id: record.get(1).unwrap_or("").to_string(),
                label: record.get(2).unwrap_or("").to_string(),
                category: record.get(3).unwrap_or("").to_string(),
                amount: record.get(4).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                date,
                spent: record.get(6).unwrap_or("false") == "true",
                created_at: record.get(7).unwrap_or("").to_string(),
            });
        }

        Ok(expenses)
    }

    fn write_expenses(&self, user_id: &str, expenses: &[PlannedExpense]) -> Result<()> {
        self.connection.ensure_user_directory(user_id)?;
        let file_path = self.get_expenses_file_path(user_id);
        let temp_file_path = file_path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_file_path)?;
            let writer = BufWriter::new(temp_file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record([
                "id", "user_id", "label", "category", "amount", "date", "spent", "created_at",
            ])?;

            for expense in expenses {
                csv_writer.write_record([
                    &expense.id,
                    &expense.user_id,
                    &expense.label,
                    &expense.category,
                    &expense.amount.to_string(),
                    &expense.date.format(DATE_FORMAT).to_string(),
                    &expense.spent.to_string(),
                    &expense.created_at,
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_file_path, &file_path)?;
        debug!("Wrote {} planned expenses to {:?}", expenses.len(), file_path);
        Ok(())
    }
}

impl PlannedExpenseStorage for PlannedExpenseRepository {
    fn store_planned_expense(&self, expense: &PlannedExpense) -> Result<()> {
        self.ensure_expenses_file_exists(&expense.user_id)?;

        let file = OpenOptions::new()
            .append(true)
            .open(self.get_expenses_file_path(&expense.user_id))?;
        let mut csv_writer = Writer::from_writer(file);

        csv_writer.write_record([
            &expense.id,
            &expense.user_id,
            &expense.label,
            &expense.category,
            &expense.amount.to_string(),
            &expense.date.format(DATE_FORMAT).to_string(),
            &expense.spent.to_string(),
            &expense.created_at,
        ])?;
        csv_writer.flush()?;

        debug!("Appended planned expense {} for user {}", expense.id, expense.user_id);
        Ok(())
    }

    fn get_planned_expense(
        &self,
        user_id: &str,
        expense_id: &str,
    ) -> Result<Option<PlannedExpense>> {
        let expenses = self.read_expenses(user_id)?;
        Ok(expenses.into_iter().find(|expense| expense.id == expense_id))
    }

    fn list_planned_expenses(
        &self,
        user_id: &str,
        include_spent: bool,
    ) -> Result<Vec<PlannedExpense>> {
        let expenses = self.read_expenses(user_id)?;
        if include_spent {
            Ok(expenses)
        } else {
            Ok(expenses.into_iter().filter(|expense| !expense.spent).collect())
        }
    }

    fn update_planned_expense(&self, expense: &PlannedExpense) -> Result<()> {
        let mut expenses = self.read_expenses(&expense.user_id)?;

        let position = expenses.iter().position(|existing| existing.id == expense.id);
        match position {
            Some(index) => {
                expenses[index] = expense.clone();
                self.write_expenses(&expense.user_id, &expenses)
            }
            None => Err(anyhow::anyhow!("Planned expense not found: {}", expense.id)),
        }
    }

    fn delete_planned_expense(&self, user_id: &str, expense_id: &str) -> Result<bool> {
        let mut expenses = self.read_expenses(user_id)?;
        let initial_len = expenses.len();
        expenses.retain(|expense| expense.id != expense_id);

        if expenses.len() == initial_len {
            return Ok(false);
        }

        self.write_expenses(user_id, &expenses)?;
        Ok(true)
    }
}
