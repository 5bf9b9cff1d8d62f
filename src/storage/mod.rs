//! Storage abstractions and the file-based backend.

pub mod csv;
pub mod traits;

pub use traits::{
    AdjustmentStorage, Connection, PlannedExpenseStorage, RecurringItemStorage, SettingsStorage,
};
