//! Service for managing one-off planned expenses.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::planned_expense::{
    CreatePlannedExpenseCommand, CreatePlannedExpenseResult, MarkSpentCommand, MarkSpentResult,
};
use crate::domain::error::DomainError;
use crate::domain::models::PlannedExpense;
use crate::storage::traits::{Connection, PlannedExpenseStorage};

#[derive(Clone)]
pub struct PlannedExpenseService<C: Connection> {
    planned_expense_repository: C::PlannedExpenseRepository,
}

impl<C: Connection> PlannedExpenseService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            planned_expense_repository: connection.create_planned_expense_repository(),
        }
    }

    /// Create a planned expense.
    ///
    /// The date-not-in-the-past invariant is checked here only; reads never
    /// re-verify it.
    pub fn create_planned_expense(
        &self,
        command: CreatePlannedExpenseCommand,
        today: NaiveDate,
    ) -> Result<CreatePlannedExpenseResult> {
        info!("Creating planned expense: {:?}", command);

        if command.label.trim().is_empty() {
            return Err(
                DomainError::InvalidInput("Planned expense label cannot be empty".to_string())
                    .into(),
            );
        }
        if !command.amount.is_finite() || command.amount <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "Planned expense amount must be positive, got {}",
                command.amount
            ))
            .into());
        }
        if command.date < today {
            return Err(DomainError::InvalidInput(format!(
                "Planned expense date {} cannot be in the past",
                command.date
            ))
            .into());
        }

        let expense = PlannedExpense {
            id: PlannedExpense::generate_id(),
            user_id: command.user_id,
            label: command.label.trim().to_string(),
            category: command.category,
            amount: command.amount,
            date: command.date,
            spent: false,
            created_at: Utc::now().to_rfc3339(),
        };

        self.planned_expense_repository.store_planned_expense(&expense)?;

        info!(
            "Created planned expense '{}': ${:.2} on {}",
            expense.label, expense.amount, expense.date
        );

        Ok(CreatePlannedExpenseResult {
            expense,
            success_message: "Planned expense created".to_string(),
        })
    }

    pub fn list_planned_expenses(
        &self,
        user_id: &str,
        include_spent: bool,
    ) -> Result<Vec<PlannedExpense>> {
        self.planned_expense_repository.list_planned_expenses(user_id, include_spent)
    }

    /// Flip a planned expense to spent.
    pub fn mark_spent(&self, command: MarkSpentCommand) -> Result<MarkSpentResult> {
        info!("Marking planned expense as spent: {:?}", command);

        let mut expense = self
            .planned_expense_repository
            .get_planned_expense(&command.user_id, &command.expense_id)?
            .ok_or_else(|| anyhow::anyhow!("Planned expense not found: {}", command.expense_id))?;

        if expense.spent {
            warn!("Planned expense {} is already marked as spent", expense.id);
        } else {
            expense.spent = true;
            self.planned_expense_repository.update_planned_expense(&expense)?;
        }

        Ok(MarkSpentResult {
            expense,
            success_message: "Planned expense marked as spent".to_string(),
        })
    }

    /// Delete a planned expense. Returns false when it was not found.
    pub fn delete_planned_expense(&self, user_id: &str, expense_id: &str) -> Result<bool> {
        let deleted = self
            .planned_expense_repository
            .delete_planned_expense(user_id, expense_id)?;
        if deleted {
            info!("Deleted planned expense {} for user {}", expense_id, user_id);
        } else {
            warn!("No planned expense {} found to delete for user {}", expense_id, user_id);
        }
        Ok(deleted)
    }
}
