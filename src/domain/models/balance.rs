//! Derived balance, projection and reset views.
//!
//! Nothing in this module is persisted; every value is recomputed from the
//! stored ledgers on each request.
use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};

use super::adjustment::BalanceAdjustment;

/// Round a monetary value to 2 decimal places, half away from zero.
///
/// Callers must not chain further arithmetic on the rounded figure; rounding
/// happens once, at the output boundary.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A full snapshot of a user's balance state at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub current_balance: f64,
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_planned: f64,
    pub projected_balance: f64,
    pub margin_amount: f64,
    /// Most recent adjustments, newest first, capped for display. The
    /// balance sum always covers the full ledger, not this list.
    pub adjustments: Vec<BalanceAdjustment>,
}

/// One income/expense/planned-expense firing recorded on a projected day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionEvent {
    pub label: String,
    pub amount: f64,
}

/// The items that fired on a single projected day, grouped by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEvents {
    pub incomes: Vec<ProjectionEvent>,
    pub expenses: Vec<ProjectionEvent>,
    pub planned_expenses: Vec<ProjectionEvent>,
}

/// One entry of the forward day-by-day balance projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub date: NaiveDate,
    pub balance: f64,
    /// 0-based offset from today.
    pub day: u32,
    /// Absent on days where nothing fired, to keep the payload compact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<DayEvents>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    NegativeBalance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

/// One synthetic month entry of the trends view. The current implementation
/// repeats present-day totals per period rather than replaying real history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub year: i32,
    pub month: u32,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
}

/// Outcome of a monthly reset, with the figures it was booked from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetResult {
    pub reset_date: NaiveDate,
    pub previous_balance: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub net_change: f64,
    pub balance: BalanceSnapshot,
}

/// Advisory reset-due signal. Nothing enforces it; callers decide whether to
/// trigger a reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetStatus {
    pub last_reset: Option<DateTime<Utc>>,
    pub next_reset: NaiveDate,
    pub is_reset_due: bool,
    pub days_since_last_reset: Option<i64>,
}
