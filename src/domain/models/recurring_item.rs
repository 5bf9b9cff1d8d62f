//! Domain model for a recurring income or expense.
use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use uuid::Uuid;

/// How often a recurring item fires.
///
/// The payload shape varies by kind: one-time items carry their absolute
/// date, quarterly and yearly items carry an optional explicit list of due
/// months. Missing month lists fall back to the documented defaults
/// ([1,4,7,10] for quarterly, [1] for yearly).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frequency {
    OneTime { date: NaiveDate },
    Monthly,
    Quarterly { months: Option<Vec<u32>> },
    Yearly { months: Option<Vec<u32>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurringKind {
    Income,
    Expense,
}

impl RecurringKind {
    /// Convert to string for CSV storage
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringKind::Income => "income",
            RecurringKind::Expense => "expense",
        }
    }

    /// Parse from string for CSV loading
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "income" => Ok(RecurringKind::Income),
            "expense" => Ok(RecurringKind::Expense),
            _ => Err(format!("Invalid recurring kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringItem {
    pub id: String,
    pub user_id: String,
    pub kind: RecurringKind,
    pub label: String,
    pub category: String,
    pub amount: f64,
    /// Day of the month the item fires on (1-31).
    pub day_of_month: u32,
    pub frequency: Frequency,
    pub created_at: String,
    pub updated_at: String,
}

impl RecurringItem {
    /// Generate a unique item ID.
    /// Format: <kind>::<uuid>
    pub fn generate_id(kind: RecurringKind) -> String {
        format!("{}::{}", kind.as_str(), Uuid::new_v4())
    }
}
