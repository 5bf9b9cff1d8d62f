//! Domain model for a balance adjustment ledger entry.
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentKind {
    ManualAdjustment,
    Correction,
    MonthlyReset,
}

impl AdjustmentKind {
    /// Convert to string for CSV storage
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentKind::ManualAdjustment => "manual_adjustment",
            AdjustmentKind::Correction => "correction",
            AdjustmentKind::MonthlyReset => "monthly_reset",
        }
    }

    /// Parse from string for CSV loading
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "manual_adjustment" => Ok(AdjustmentKind::ManualAdjustment),
            "correction" => Ok(AdjustmentKind::Correction),
            "monthly_reset" => Ok(AdjustmentKind::MonthlyReset),
            _ => Err(format!("Invalid adjustment kind: {}", s)),
        }
    }
}

/// An append-only signed delta against a user's balance.
///
/// Entries are never mutated or deleted by the domain layer. They are listed
/// newest-first for display and summed unordered for balance math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceAdjustment {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub description: String,
    pub kind: AdjustmentKind,
    pub created_at: DateTime<Utc>,
}

impl BalanceAdjustment {
    /// Generate a unique adjustment ID.
    /// Format: adjustment::<uuid>
    pub fn generate_id() -> String {
        format!("adjustment::{}", Uuid::new_v4())
    }
}
