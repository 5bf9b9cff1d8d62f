//! Domain model for per-user budget settings.
use serde::{Deserialize, Serialize};

/// The anchor values every balance calculation starts from.
///
/// `month_start_day` is informational for balance math; only the monthly
/// reset status consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: String,
    pub initial_balance: f64,
    /// Safety margin percentage subtracted from the computed balance (0-50).
    pub margin_pct: f64,
    /// Day of the month the user's budget cycle starts on (1-31).
    pub month_start_day: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl UserSettings {
    pub fn is_valid_margin_pct(margin_pct: f64) -> bool {
        margin_pct.is_finite() && (0.0..=50.0).contains(&margin_pct)
    }

    pub fn is_valid_month_start_day(day: u32) -> bool {
        (1..=31).contains(&day)
    }
}
