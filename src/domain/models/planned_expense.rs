//! Domain model for a one-off planned expense.
use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use uuid::Uuid;

/// A dated, one-off expense the user plans to make.
///
/// `spent` flips either by explicit user action or when the caller marks the
/// expense after its date has passed. Balance calculations derive "already
/// occurred" from `date` alone; the flag is kept alongside for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExpense {
    pub id: String,
    pub user_id: String,
    pub label: String,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub spent: bool,
    pub created_at: String,
}

impl PlannedExpense {
    /// Generate a unique planned expense ID.
    /// Format: planned::<uuid>
    pub fn generate_id() -> String {
        format!("planned::{}", Uuid::new_v4())
    }
}
