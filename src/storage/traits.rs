//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;

use crate::domain::models::{
    BalanceAdjustment, PlannedExpense, RecurringItem, RecurringKind, UserSettings,
};

/// Trait defining the interface for user settings storage operations.
pub trait SettingsStorage: Send + Sync {
    /// Retrieve the settings record for a user, `None` if the user has none.
    fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>>;

    /// Store (create or replace) the settings record for a user.
    fn store_settings(&self, settings: &UserSettings) -> Result<()>;
}

/// Trait defining the interface for recurring item storage operations.
///
/// This trait abstracts away the specific storage implementation details,
/// allowing the domain layer to work with different storage backends
/// without modification.
pub trait RecurringItemStorage: Send + Sync {
    /// Store a new recurring item
    fn store_item(&self, item: &RecurringItem) -> Result<()>;

    /// Retrieve a specific recurring item by ID
    fn get_item(&self, user_id: &str, item_id: &str) -> Result<Option<RecurringItem>>;

    /// List all recurring items of one kind for a user, in stored order
    fn list_items(&self, user_id: &str, kind: RecurringKind) -> Result<Vec<RecurringItem>>;

    /// Update an existing recurring item
    fn update_item(&self, item: &RecurringItem) -> Result<()>;

    /// Delete a recurring item
    /// Returns true if the item was found and deleted, false otherwise
    fn delete_item(&self, user_id: &str, item_id: &str) -> Result<bool>;
}

/// Trait defining the interface for planned expense storage operations.
pub trait PlannedExpenseStorage: Send + Sync {
    /// Store a new planned expense
    fn store_planned_expense(&self, expense: &PlannedExpense) -> Result<()>;

    /// Retrieve a specific planned expense by ID
    fn get_planned_expense(&self, user_id: &str, expense_id: &str)
        -> Result<Option<PlannedExpense>>;

    /// List planned expenses for a user, in stored order.
    /// With `include_spent` false, only unspent expenses are returned.
    fn list_planned_expenses(&self, user_id: &str, include_spent: bool)
        -> Result<Vec<PlannedExpense>>;

    /// Update an existing planned expense
    fn update_planned_expense(&self, expense: &PlannedExpense) -> Result<()>;

    /// Delete a planned expense
    /// Returns true if the expense was found and deleted, false otherwise
    fn delete_planned_expense(&self, user_id: &str, expense_id: &str) -> Result<bool>;
}

/// Trait defining the interface for balance adjustment storage operations.
///
/// The adjustment ledger is append-only; there is no update or delete.
pub trait AdjustmentStorage: Send + Sync {
    /// Append a new adjustment to the ledger
    fn insert_adjustment(&self, adjustment: &BalanceAdjustment) -> Result<()>;

    /// List the full adjustment ledger for a user, newest first.
    /// Any display cap is the caller's concern; the balance sum needs every
    /// entry.
    fn list_adjustments(&self, user_id: &str) -> Result<Vec<BalanceAdjustment>>;
}

/// Trait defining the interface for storage connections.
///
/// This trait abstracts away the specific connection type and provides
/// factory methods for creating repositories, so the domain layer can work
/// with any storage backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone {
    /// The type of SettingsStorage this connection creates
    type SettingsRepository: SettingsStorage + Clone;

    /// The type of RecurringItemStorage this connection creates
    type RecurringItemRepository: RecurringItemStorage + Clone;

    /// The type of PlannedExpenseStorage this connection creates
    type PlannedExpenseRepository: PlannedExpenseStorage + Clone;

    /// The type of AdjustmentStorage this connection creates
    type AdjustmentRepository: AdjustmentStorage + Clone;

    /// Create a new settings repository for this connection
    fn create_settings_repository(&self) -> Self::SettingsRepository;

    /// Create a new recurring item repository for this connection
    fn create_recurring_item_repository(&self) -> Self::RecurringItemRepository;

    /// Create a new planned expense repository for this connection
    fn create_planned_expense_repository(&self) -> Self::PlannedExpenseRepository;

    /// Create a new adjustment repository for this connection
    fn create_adjustment_repository(&self) -> Self::AdjustmentRepository;
}
