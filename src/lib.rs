//! # Budget Tracker Backend
//!
//! Balance and projection engine for a personal budget tracker. Users
//! register recurring incomes and expenses, one-off planned expenses and
//! manual balance adjustments; this crate computes the running balance and a
//! forward day-by-day projection over them.
//!
//! The HTTP layer and any UI are external to this crate; they consume the
//! services wired up by [`Backend`]. Storage is abstracted behind the traits
//! in [`storage::traits`], with a file-based implementation in
//! [`storage::csv`].
//!
//! Every calculation takes its reference date (`today`) as an explicit
//! parameter; the domain layer never reads the system clock for balance
//! math.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod storage;

pub use crate::domain::{
    BalanceService, DomainError, PlannedExpenseService, ProjectionService, RecurringService,
    ResetService,
};
pub use crate::storage::csv::CsvConnection;
use crate::storage::traits::Connection;

/// Main backend struct that orchestrates all services.
pub struct Backend<C: Connection> {
    pub balance_service: BalanceService<C>,
    pub projection_service: ProjectionService<C>,
    pub reset_service: ResetService<C>,
    pub recurring_service: RecurringService<C>,
    pub planned_expense_service: PlannedExpenseService<C>,
}

impl<C: Connection> Backend<C> {
    /// Create a new backend instance with all services over one connection.
    pub fn new(connection: Arc<C>) -> Self {
        let balance_service = BalanceService::new(connection.clone());
        let projection_service = ProjectionService::new(connection.clone());
        let reset_service = ResetService::new(connection.clone(), balance_service.clone());
        let recurring_service = RecurringService::new(connection.clone());
        let planned_expense_service = PlannedExpenseService::new(connection);

        Self {
            balance_service,
            projection_service,
            reset_service,
            recurring_service,
            planned_expense_service,
        }
    }
}

impl Backend<CsvConnection> {
    /// Create a backend over a file-based data directory.
    pub fn open<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        let connection = Arc::new(CsvConnection::new(data_directory)?);
        Ok(Self::new(connection))
    }
}
