//! Service for managing recurring incomes and expenses.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::recurring::{
    AddRecurringItemCommand, AddRecurringItemResult, UpdateRecurringItemCommand,
    UpdateRecurringItemResult,
};
use crate::domain::error::DomainError;
use crate::domain::frequency;
use crate::domain::models::{RecurringItem, RecurringKind};
use crate::storage::traits::{Connection, RecurringItemStorage};

#[derive(Clone)]
pub struct RecurringService<C: Connection> {
    recurring_repository: C::RecurringItemRepository,
}

impl<C: Connection> RecurringService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            recurring_repository: connection.create_recurring_item_repository(),
        }
    }

    /// Add a new recurring income or expense.
    pub fn add_item(&self, command: AddRecurringItemCommand) -> Result<AddRecurringItemResult> {
        info!("Adding recurring item: {:?}", command);

        validate_label(&command.label)?;
        validate_amount(command.amount)?;
        validate_day_of_month(command.day_of_month)?;

        let now = Utc::now().to_rfc3339();
        let item = RecurringItem {
            id: RecurringItem::generate_id(command.kind),
            user_id: command.user_id,
            kind: command.kind,
            label: command.label.trim().to_string(),
            category: command.category,
            amount: command.amount,
            day_of_month: command.day_of_month,
            frequency: command.frequency,
            created_at: now.clone(),
            updated_at: now,
        };

        self.recurring_repository.store_item(&item)?;

        info!(
            "Added {} '{}': ${:.2} on day {}",
            item.kind.as_str(),
            item.label,
            item.amount,
            item.day_of_month
        );

        Ok(AddRecurringItemResult {
            item,
            success_message: "Recurring item added".to_string(),
        })
    }

    /// Update an existing recurring item's mutable fields.
    pub fn update_item(
        &self,
        command: UpdateRecurringItemCommand,
    ) -> Result<UpdateRecurringItemResult> {
        info!("Updating recurring item: {:?}", command);

        let mut item = self
            .recurring_repository
            .get_item(&command.user_id, &command.item_id)?
            .ok_or_else(|| anyhow::anyhow!("Recurring item not found: {}", command.item_id))?;

        if let Some(label) = command.label {
            validate_label(&label)?;
            item.label = label.trim().to_string();
        }
        if let Some(category) = command.category {
            item.category = category;
        }
        if let Some(amount) = command.amount {
            validate_amount(amount)?;
            item.amount = amount;
        }
        if let Some(day_of_month) = command.day_of_month {
            validate_day_of_month(day_of_month)?;
            item.day_of_month = day_of_month;
        }
        if let Some(frequency) = command.frequency {
            item.frequency = frequency;
        }
        item.updated_at = Utc::now().to_rfc3339();

        self.recurring_repository.update_item(&item)?;

        Ok(UpdateRecurringItemResult {
            item,
            success_message: "Recurring item updated".to_string(),
        })
    }

    /// Delete a recurring item. Returns false when the item was not found.
    pub fn delete_item(&self, user_id: &str, item_id: &str) -> Result<bool> {
        let deleted = self.recurring_repository.delete_item(user_id, item_id)?;
        if deleted {
            info!("Deleted recurring item {} for user {}", item_id, user_id);
        } else {
            warn!("No recurring item {} found to delete for user {}", item_id, user_id);
        }
        Ok(deleted)
    }

    pub fn list_incomes(&self, user_id: &str) -> Result<Vec<RecurringItem>> {
        self.recurring_repository.list_items(user_id, RecurringKind::Income)
    }

    pub fn list_expenses(&self, user_id: &str) -> Result<Vec<RecurringItem>> {
        self.recurring_repository.list_items(user_id, RecurringKind::Expense)
    }

    /// Next calendar date the item fires on, `None` for one-time items whose
    /// date already passed.
    pub fn next_due_date(
        &self,
        user_id: &str,
        item_id: &str,
        today: NaiveDate,
    ) -> Result<Option<NaiveDate>> {
        let item = self
            .recurring_repository
            .get_item(user_id, item_id)?
            .ok_or_else(|| anyhow::anyhow!("Recurring item not found: {}", item_id))?;

        Ok(frequency::next_due_date(&item.frequency, item.day_of_month, today))
    }
}

fn validate_label(label: &str) -> Result<()> {
    if label.trim().is_empty() {
        return Err(DomainError::InvalidInput("Item label cannot be empty".to_string()).into());
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(
            DomainError::InvalidInput(format!("Item amount must be positive, got {}", amount))
                .into(),
        );
    }
    Ok(())
}

fn validate_day_of_month(day_of_month: u32) -> Result<()> {
    if !(1..=31).contains(&day_of_month) {
        return Err(DomainError::InvalidInput(format!(
            "Day of month must be between 1 and 31, got {}",
            day_of_month
        ))
        .into());
    }
    Ok(())
}
