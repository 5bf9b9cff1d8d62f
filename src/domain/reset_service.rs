//! Monthly reset orchestration.
//!
//! Books the net recurring income/expense delta as a ledger adjustment,
//! marking a new budget cycle. The operation is NOT idempotent: every call
//! books another entry. `get_monthly_reset_status` is the advisory signal
//! callers can use to decide whether a reset is due; nothing enforces it.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use log::info;
use std::sync::Arc;

use crate::domain::balance_service::BalanceService;
use crate::domain::error::{wrap_unexpected, DomainError};
use crate::domain::frequency::clamped_day_in_month;
use crate::domain::models::balance::round_to_cents;
use crate::domain::models::{
    AdjustmentKind, BalanceAdjustment, RecurringKind, ResetResult, ResetStatus,
};
use crate::storage::traits::{
    AdjustmentStorage, Connection, RecurringItemStorage, SettingsStorage,
};

/// A reset counts as overdue once this many days have passed since the last
/// one.
const RESET_OVERDUE_DAYS: i64 = 30;

/// Service orchestrating monthly resets over the balance aggregator and the
/// adjustment ledger.
#[derive(Clone)]
pub struct ResetService<C: Connection> {
    settings_repository: C::SettingsRepository,
    recurring_repository: C::RecurringItemRepository,
    adjustment_repository: C::AdjustmentRepository,
    balance_service: BalanceService<C>,
}

impl<C: Connection> ResetService<C> {
    pub fn new(connection: Arc<C>, balance_service: BalanceService<C>) -> Self {
        Self {
            settings_repository: connection.create_settings_repository(),
            recurring_repository: connection.create_recurring_item_repository(),
            adjustment_repository: connection.create_adjustment_repository(),
            balance_service,
        }
    }

    /// Book the month's net recurring delta as a `MonthlyReset` adjustment.
    ///
    /// The income and expense figures are FULL recurring sums, not
    /// current-month-gated contributions. Calling twice books the net change
    /// twice; deduplication is the caller's responsibility.
    pub fn trigger_monthly_reset(&self, user_id: &str, today: NaiveDate) -> Result<ResetResult> {
        self.trigger_monthly_reset_inner(user_id, today)
            .map_err(|e| wrap_unexpected(e, DomainError::ResetFailed, "monthly reset"))
    }

    fn trigger_monthly_reset_inner(&self, user_id: &str, today: NaiveDate) -> Result<ResetResult> {
        info!("Triggering monthly reset for user {} on {}", user_id, today);

        let previous = self.balance_service.calculate_balance(user_id, today)?;

        let monthly_income: f64 = self
            .recurring_repository
            .list_items(user_id, RecurringKind::Income)?
            .iter()
            .map(|item| item.amount)
            .sum();
        let monthly_expenses: f64 = self
            .recurring_repository
            .list_items(user_id, RecurringKind::Expense)?
            .iter()
            .map(|item| item.amount)
            .sum();
        let net_change = monthly_income - monthly_expenses;

        let adjustment = BalanceAdjustment {
            id: BalanceAdjustment::generate_id(),
            user_id: user_id.to_string(),
            amount: net_change,
            description: format!("Monthly reset for {}", today.format("%Y-%m")),
            kind: AdjustmentKind::MonthlyReset,
            created_at: Utc::now(),
        };
        self.adjustment_repository.insert_adjustment(&adjustment)?;

        info!(
            "Booked monthly reset for {}: income {:.2}, expenses {:.2}, net {:.2}",
            user_id, monthly_income, monthly_expenses, net_change
        );

        let balance = self.balance_service.calculate_balance(user_id, today)?;

        Ok(ResetResult {
            reset_date: today,
            previous_balance: previous.current_balance,
            monthly_income: round_to_cents(monthly_income),
            monthly_expenses: round_to_cents(monthly_expenses),
            net_change: round_to_cents(net_change),
            balance,
        })
    }

    /// Advisory "is a reset due" signal. Pure read, no side effects.
    pub fn get_monthly_reset_status(&self, user_id: &str, today: NaiveDate) -> Result<ResetStatus> {
        let settings = self
            .settings_repository
            .get_settings(user_id)?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        let adjustments = self.adjustment_repository.list_adjustments(user_id)?;
        let last_reset: Option<DateTime<Utc>> = adjustments
            .iter()
            .filter(|adjustment| adjustment.kind == AdjustmentKind::MonthlyReset)
            .map(|adjustment| adjustment.created_at)
            .max();

        let days_since_last_reset =
            last_reset.map(|reset| (today - reset.date_naive()).num_days());

        let next_reset = next_occurrence_of_day(settings.month_start_day, today);

        // Due when no reset was ever booked, the last one is older than a
        // cycle, or the cycle day has been reached this month.
        let is_reset_due = days_since_last_reset.map_or(true, |days| days > RESET_OVERDUE_DAYS)
            || today.day() >= settings.month_start_day;

        Ok(ResetStatus {
            last_reset,
            next_reset,
            is_reset_due,
            days_since_last_reset,
        })
    }
}

/// The next date (today or later) whose day-of-month is `day`, clamped to
/// month length.
fn next_occurrence_of_day(day: u32, today: NaiveDate) -> NaiveDate {
    let candidate = clamped_day_in_month(today.year(), today.month(), day);
    if candidate >= today {
        return candidate;
    }
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    clamped_day_in_month(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Frequency, RecurringItem, UserSettings};
    use crate::storage::csv::CsvConnection;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn setup_test() -> (ResetService<CsvConnection>, Arc<CsvConnection>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let balance_service = BalanceService::new(connection.clone());
        (
            ResetService::new(connection.clone(), balance_service),
            connection,
            temp_dir,
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()
    }

    fn create_settings(connection: &CsvConnection, user_id: &str, month_start_day: u32) {
        let repo = connection.create_settings_repository();
        repo.store_settings(&UserSettings {
            user_id: user_id.to_string(),
            initial_balance: 1000.0,
            margin_pct: 0.0,
            month_start_day,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        })
        .unwrap();
    }

    fn create_item(
        connection: &CsvConnection,
        user_id: &str,
        kind: RecurringKind,
        amount: f64,
        day_of_month: u32,
    ) {
        let repo = connection.create_recurring_item_repository();
        repo.store_item(&RecurringItem {
            id: RecurringItem::generate_id(kind),
            user_id: user_id.to_string(),
            kind,
            label: "Test item".to_string(),
            category: "misc".to_string(),
            amount,
            day_of_month,
            frequency: Frequency::Monthly,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        })
        .unwrap();
    }

    fn reset_entries(connection: &CsvConnection, user_id: &str) -> Vec<BalanceAdjustment> {
        connection
            .create_adjustment_repository()
            .list_adjustments(user_id)
            .unwrap()
            .into_iter()
            .filter(|adjustment| adjustment.kind == AdjustmentKind::MonthlyReset)
            .collect()
    }

    #[test]
    fn test_reset_books_ungated_net_change() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 1);
        create_item(&connection, "user::1", RecurringKind::Income, 2000.0, 1);
        // Day 28 has not been reached on the 20th, but the reset sums the
        // raw amount anyway.
        create_item(&connection, "user::1", RecurringKind::Expense, 500.0, 28);

        let result = service.trigger_monthly_reset("user::1", today()).unwrap();

        assert_eq!(result.monthly_income, 2000.0);
        assert_eq!(result.monthly_expenses, 500.0);
        assert_eq!(result.net_change, 1500.0);
        assert_eq!(result.reset_date, today());
        // Income fired on the 1st, the day-28 expense has not: 1000 + 2000.
        assert_eq!(result.previous_balance, 3000.0);

        let entries = reset_entries(&connection, "user::1");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 1500.0);
    }

    #[test]
    fn test_reset_is_not_idempotent() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 1);
        create_item(&connection, "user::1", RecurringKind::Income, 2000.0, 1);
        create_item(&connection, "user::1", RecurringKind::Expense, 500.0, 1);

        let first = service.trigger_monthly_reset("user::1", today()).unwrap();
        let second = service.trigger_monthly_reset("user::1", today()).unwrap();

        // No dedup guard: both calls book the same net change again.
        assert_eq!(first.net_change, 1500.0);
        assert_eq!(second.net_change, 1500.0);

        let entries = reset_entries(&connection, "user::1");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount, 1500.0);
        assert_eq!(entries[1].amount, 1500.0);

        // Reset entries are excluded from the balance sum; the snapshot
        // reflects the gated recurring pass only.
        assert_eq!(second.balance.current_balance, first.balance.current_balance);
        assert_eq!(second.balance.adjustments.len(), 2);
    }

    #[test]
    fn test_status_with_no_reset_ever() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 25);

        let status = service.get_monthly_reset_status("user::1", today()).unwrap();
        assert!(status.last_reset.is_none());
        assert!(status.days_since_last_reset.is_none());
        assert!(status.is_reset_due);
        assert_eq!(status.next_reset, NaiveDate::from_ymd_opt(2025, 7, 25).unwrap());
    }

    #[test]
    fn test_status_with_recent_reset_not_due() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 25);

        let repo = connection.create_adjustment_repository();
        repo.insert_adjustment(&BalanceAdjustment {
            id: "adjustment::reset".to_string(),
            user_id: "user::1".to_string(),
            amount: 1500.0,
            description: "Monthly reset for 2025-07".to_string(),
            kind: AdjustmentKind::MonthlyReset,
            created_at: Utc.with_ymd_and_hms(2025, 7, 10, 8, 0, 0).unwrap(),
        })
        .unwrap();

        // 10 days since the last reset and the 25th not yet reached.
        let status = service.get_monthly_reset_status("user::1", today()).unwrap();
        assert_eq!(status.days_since_last_reset, Some(10));
        assert!(!status.is_reset_due);
    }

    #[test]
    fn test_status_due_when_overdue_or_cycle_day_reached() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 25);

        let repo = connection.create_adjustment_repository();
        repo.insert_adjustment(&BalanceAdjustment {
            id: "adjustment::reset".to_string(),
            user_id: "user::1".to_string(),
            amount: 1500.0,
            description: "Monthly reset for 2025-06".to_string(),
            kind: AdjustmentKind::MonthlyReset,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        })
        .unwrap();

        // 49 days elapsed: overdue.
        let status = service.get_monthly_reset_status("user::1", today()).unwrap();
        assert_eq!(status.days_since_last_reset, Some(49));
        assert!(status.is_reset_due);

        // Fresh reset, but the cycle day itself has been reached.
        create_settings(&connection, "user::2", 15);
        repo.insert_adjustment(&BalanceAdjustment {
            id: "adjustment::reset2".to_string(),
            user_id: "user::2".to_string(),
            amount: 0.0,
            description: "Monthly reset for 2025-07".to_string(),
            kind: AdjustmentKind::MonthlyReset,
            created_at: Utc.with_ymd_and_hms(2025, 7, 15, 8, 0, 0).unwrap(),
        })
        .unwrap();
        let status = service.get_monthly_reset_status("user::2", today()).unwrap();
        assert_eq!(status.days_since_last_reset, Some(5));
        assert!(status.is_reset_due);
    }

    #[test]
    fn test_next_occurrence_clamps_short_months() {
        // Day 31 in September clamps to the 30th.
        assert_eq!(
            next_occurrence_of_day(31, NaiveDate::from_ymd_opt(2025, 9, 10).unwrap()),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()
        );
        // Past this month's occurrence: next month, clamped.
        assert_eq!(
            next_occurrence_of_day(31, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
        assert_eq!(
            next_occurrence_of_day(30, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        // December rolls into January.
        assert_eq!(
            next_occurrence_of_day(5, NaiveDate::from_ymd_opt(2025, 12, 10).unwrap()),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
        );
    }

    #[test]
    fn test_status_user_not_found() {
        let (service, _connection, _temp_dir) = setup_test();
        let err = service.get_monthly_reset_status("ghost", today()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::UserNotFound(_))
        ));
    }
}
