//! Commands and results for recurring item operations.
use crate::domain::models::{Frequency, RecurringItem, RecurringKind};

#[derive(Debug, Clone)]
pub struct AddRecurringItemCommand {
    pub user_id: String,
    pub kind: RecurringKind,
    pub label: String,
    pub category: String,
    pub amount: f64,
    pub day_of_month: u32,
    pub frequency: Frequency,
}

#[derive(Debug, Clone)]
pub struct AddRecurringItemResult {
    pub item: RecurringItem,
    pub success_message: String,
}

#[derive(Debug, Clone)]
pub struct UpdateRecurringItemCommand {
    pub user_id: String,
    pub item_id: String,
    pub label: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub day_of_month: Option<u32>,
    pub frequency: Option<Frequency>,
}

#[derive(Debug, Clone)]
pub struct UpdateRecurringItemResult {
    pub item: RecurringItem,
    pub success_message: String,
}
