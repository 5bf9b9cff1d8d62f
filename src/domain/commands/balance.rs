//! Commands and results for balance operations.
use crate::domain::models::{AdjustmentKind, BalanceAdjustment, BalanceSnapshot, UserSettings};

#[derive(Debug, Clone)]
pub struct AdjustBalanceCommand {
    pub user_id: String,
    pub amount: f64,
    pub description: String,
    pub kind: AdjustmentKind,
}

#[derive(Debug, Clone)]
pub struct AdjustBalanceResult {
    pub adjustment: BalanceAdjustment,
    pub balance: BalanceSnapshot,
    pub success_message: String,
}

#[derive(Debug, Clone)]
pub struct UpdateSettingsCommand {
    pub user_id: String,
    pub initial_balance: Option<f64>,
    pub margin_pct: Option<f64>,
    pub month_start_day: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct UpdateSettingsResult {
    pub settings: UserSettings,
    pub success_message: String,
}
