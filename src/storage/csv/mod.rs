//! # File-based Storage Module
//!
//! This module provides a file-based storage implementation for the budget
//! tracker. The domain layer is storage-agnostic; these repositories satisfy
//! the same traits an SQL implementation would.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! └── {user_id}/
//!     ├── settings.yaml
//!     ├── recurring_items.csv
//!     ├── planned_expenses.csv
//!     └── adjustments.csv
//! ```
//!
//! All writes either append to a ledger file or atomically replace a file
//! via a temp-file-plus-rename.

pub mod adjustment_repository;
pub mod connection;
pub mod planned_expense_repository;
pub mod recurring_repository;
pub mod settings_repository;

pub use adjustment_repository::AdjustmentRepository;
pub use connection::CsvConnection;
pub use planned_expense_repository::PlannedExpenseRepository;
pub use recurring_repository::RecurringRepository;
pub use settings_repository::SettingsRepository;
