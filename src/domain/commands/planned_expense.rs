//! Commands and results for planned expense operations.
use chrono::NaiveDate;

use crate::domain::models::PlannedExpense;

#[derive(Debug, Clone)]
pub struct CreatePlannedExpenseCommand {
    pub user_id: String,
    pub label: String,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct CreatePlannedExpenseResult {
    pub expense: PlannedExpense,
    pub success_message: String,
}

#[derive(Debug, Clone)]
pub struct MarkSpentCommand {
    pub user_id: String,
    pub expense_id: String,
}

#[derive(Debug, Clone)]
pub struct MarkSpentResult {
    pub expense: PlannedExpense,
    pub success_message: String,
}
