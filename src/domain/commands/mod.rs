//! Command and result structs consumed by the domain services.

pub mod balance;
pub mod planned_expense;
pub mod recurring;
