//! Domain layer: calculation engine and services over the storage traits.

pub mod balance_service;
pub mod commands;
pub mod error;
pub mod frequency;
pub mod models;
pub mod planned_expense_service;
pub mod projection_service;
pub mod recurring_service;
pub mod reset_service;

pub use balance_service::BalanceService;
pub use error::DomainError;
pub use planned_expense_service::PlannedExpenseService;
pub use projection_service::{ProjectionService, DEFAULT_PROJECTION_DAYS};
pub use recurring_service::RecurringService;
pub use reset_service::ResetService;
