//! Forward balance projection.
//!
//! Walks day by day from today, replaying which recurring items and planned
//! expenses fire on each date, and emits a running balance time series with
//! per-day event detail.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use log::info;
use std::sync::Arc;

use crate::domain::error::{wrap_unexpected, DomainError};
use crate::domain::frequency;
use crate::domain::models::balance::round_to_cents;
use crate::domain::models::{
    AdjustmentKind, DayEvents, ProjectionEvent, ProjectionPoint, RecurringKind,
};
use crate::storage::traits::{
    AdjustmentStorage, Connection, PlannedExpenseStorage, RecurringItemStorage, SettingsStorage,
};

/// Window length when the caller does not ask for one.
pub const DEFAULT_PROJECTION_DAYS: u32 = 30;

/// Service responsible for the forward day-by-day balance projection.
#[derive(Clone)]
pub struct ProjectionService<C: Connection> {
    settings_repository: C::SettingsRepository,
    recurring_repository: C::RecurringItemRepository,
    planned_expense_repository: C::PlannedExpenseRepository,
    adjustment_repository: C::AdjustmentRepository,
}

impl<C: Connection> ProjectionService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            settings_repository: connection.create_settings_repository(),
            recurring_repository: connection.create_recurring_item_repository(),
            planned_expense_repository: connection.create_planned_expense_repository(),
            adjustment_repository: connection.create_adjustment_repository(),
        }
    }

    /// Project the balance forward from `today` for `days` days (default 30).
    pub fn calculate_projection(
        &self,
        user_id: &str,
        days: Option<u32>,
        today: NaiveDate,
    ) -> Result<Vec<ProjectionPoint>> {
        self.calculate_projection_inner(user_id, days, today)
            .map_err(|e| wrap_unexpected(e, DomainError::ProjectionFailed, "projection"))
    }

    fn calculate_projection_inner(
        &self,
        user_id: &str,
        days: Option<u32>,
        today: NaiveDate,
    ) -> Result<Vec<ProjectionPoint>> {
        let days = days.unwrap_or(DEFAULT_PROJECTION_DAYS);

        let settings = self
            .settings_repository
            .get_settings(user_id)?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        let incomes = self.recurring_repository.list_items(user_id, RecurringKind::Income)?;
        let expenses = self.recurring_repository.list_items(user_id, RecurringKind::Expense)?;
        let planned = self
            .planned_expense_repository
            .list_planned_expenses(user_id, false)?;

        // Day-0 base: initial balance, non-reset adjustments, and everything
        // that already fired this month up to and including today.
        let mut running_balance = settings.initial_balance;

        for adjustment in self.adjustment_repository.list_adjustments(user_id)? {
            if adjustment.kind != AdjustmentKind::MonthlyReset {
                running_balance += adjustment.amount;
            }
        }
        for item in &incomes {
            running_balance += frequency::calculate_current_month_amount(
                item.amount,
                &item.frequency,
                item.day_of_month,
                today,
            );
        }
        for item in &expenses {
            running_balance -= frequency::calculate_current_month_amount(
                item.amount,
                &item.frequency,
                item.day_of_month,
                today,
            );
        }
        for expense in &planned {
            if expense.date <= today {
                running_balance -= expense.amount;
            }
        }

        info!(
            "Projecting {} days for {} from base balance {:.2}",
            days, user_id, running_balance
        );

        let mut points = Vec::with_capacity(days as usize);
        for day in 0..days {
            let projection_date = today + Duration::days(day as i64);

            let mut day_incomes = Vec::new();
            let mut day_expenses = Vec::new();
            let mut day_planned = Vec::new();

            // Day 0's fires are already folded into the base; replay starts
            // strictly after today.
            if projection_date > today {
                for item in &incomes {
                    if item.day_of_month == projection_date.day()
                        && frequency::is_due_in_month(
                            &item.frequency,
                            projection_date.month(),
                            projection_date.year(),
                        )
                    {
                        running_balance += item.amount;
                        day_incomes.push(ProjectionEvent {
                            label: item.label.clone(),
                            amount: item.amount,
                        });
                    }
                }
                for item in &expenses {
                    if item.day_of_month == projection_date.day()
                        && frequency::is_due_in_month(
                            &item.frequency,
                            projection_date.month(),
                            projection_date.year(),
                        )
                    {
                        running_balance -= item.amount;
                        day_expenses.push(ProjectionEvent {
                            label: item.label.clone(),
                            amount: item.amount,
                        });
                    }
                }
                for expense in &planned {
                    if expense.date == projection_date {
                        running_balance -= expense.amount;
                        day_planned.push(ProjectionEvent {
                            label: expense.label.clone(),
                            amount: expense.amount,
                        });
                    }
                }
            }

            let events = if day_incomes.is_empty() && day_expenses.is_empty() && day_planned.is_empty()
            {
                None
            } else {
                Some(DayEvents {
                    incomes: day_incomes,
                    expenses: day_expenses,
                    planned_expenses: day_planned,
                })
            };

            points.push(ProjectionPoint {
                date: projection_date,
                balance: round_to_cents(running_balance),
                day,
                events,
            });
        }

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Frequency, PlannedExpense, RecurringItem, UserSettings};
    use crate::storage::csv::CsvConnection;
    use tempfile::TempDir;

    fn setup_test() -> (ProjectionService<CsvConnection>, Arc<CsvConnection>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        (ProjectionService::new(connection.clone()), connection, temp_dir)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()
    }

    fn create_settings(connection: &CsvConnection, user_id: &str, initial_balance: f64) {
        let repo = connection.create_settings_repository();
        repo.store_settings(&UserSettings {
            user_id: user_id.to_string(),
            initial_balance,
            margin_pct: 0.0,
            month_start_day: 1,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        })
        .unwrap();
    }

    fn create_item(
        connection: &CsvConnection,
        user_id: &str,
        kind: RecurringKind,
        label: &str,
        amount: f64,
        day_of_month: u32,
        frequency: Frequency,
    ) {
        let repo = connection.create_recurring_item_repository();
        repo.store_item(&RecurringItem {
            id: RecurringItem::generate_id(kind),
            user_id: user_id.to_string(),
            kind,
            label: label.to_string(),
            category: "misc".to_string(),
            amount,
            day_of_month,
            frequency,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        })
        .unwrap();
    }

    fn create_planned(
        connection: &CsvConnection,
        user_id: &str,
        label: &str,
        amount: f64,
        date: NaiveDate,
        spent: bool,
    ) {
        let repo = connection.create_planned_expense_repository();
        repo.store_planned_expense(&PlannedExpense {
            id: PlannedExpense::generate_id(),
            user_id: user_id.to_string(),
            label: label.to_string(),
            category: "misc".to_string(),
            amount,
            date,
            spent,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn test_user_not_found() {
        let (service, _connection, _temp_dir) = setup_test();
        let err = service.calculate_projection("ghost", None, today()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::UserNotFound(_))
        ));
    }

    #[test]
    fn test_length_and_default_window() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 100.0);

        let points = service.calculate_projection("user::1", None, today()).unwrap();
        assert_eq!(points.len(), DEFAULT_PROJECTION_DAYS as usize);

        let points = service.calculate_projection("user::1", Some(7), today()).unwrap();
        assert_eq!(points.len(), 7);
        for (i, point) in points.iter().enumerate() {
            assert_eq!(point.day, i as u32);
            assert_eq!(point.date, today() + Duration::days(i as i64));
        }
    }

    #[test]
    fn test_day_zero_matches_base_balance() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 1000.0);
        // Already fired this month (10th <= 20th): in the base.
        create_item(&connection, "user::1", RecurringKind::Income, "Salary", 2000.0, 10, Frequency::Monthly);
        // Fires today; also in the base, and must not fire again on day 0.
        create_item(&connection, "user::1", RecurringKind::Expense, "Rent", 500.0, 20, Frequency::Monthly);
        // Past unspent planned expense: in the base.
        create_planned(&connection, "user::1", "Repair", 100.0, NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(), false);

        let points = service.calculate_projection("user::1", Some(5), today()).unwrap();
        // 1000 + 2000 - 500 - 100
        assert_eq!(points[0].balance, 2400.0);
        assert!(points[0].events.is_none());
    }

    #[test]
    fn test_monthly_item_fires_on_its_day() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 0.0);
        create_item(&connection, "user::1", RecurringKind::Income, "Salary", 1000.0, 25, Frequency::Monthly);

        let points = service.calculate_projection("user::1", Some(10), today()).unwrap();

        // Days 0..4 (20th-24th): nothing fired yet.
        for point in &points[0..5] {
            assert_eq!(point.balance, 0.0);
            assert!(point.events.is_none());
        }

        // Day 5 is the 25th.
        let firing = &points[5];
        assert_eq!(firing.date, NaiveDate::from_ymd_opt(2025, 7, 25).unwrap());
        assert_eq!(firing.balance, 1000.0);
        let events = firing.events.as_ref().unwrap();
        assert_eq!(events.incomes.len(), 1);
        assert_eq!(events.incomes[0].label, "Salary");
        assert_eq!(events.incomes[0].amount, 1000.0);

        // Balance holds afterwards.
        assert_eq!(points[9].balance, 1000.0);
    }

    #[test]
    fn test_quarterly_item_skips_non_due_months() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 0.0);
        // Due in default quarter months only; August 1st is not one.
        create_item(
            &connection,
            "user::1",
            RecurringKind::Expense,
            "Insurance",
            300.0,
            1,
            Frequency::Quarterly { months: None },
        );

        // 20 July + 15 days covers 1 August.
        let points = service.calculate_projection("user::1", Some(15), today()).unwrap();
        for point in &points {
            assert_eq!(point.balance, 0.0);
            assert!(point.events.is_none());
        }
    }

    #[test]
    fn test_planned_expense_fires_once_on_its_date() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 500.0);
        let due = NaiveDate::from_ymd_opt(2025, 7, 23).unwrap();
        create_planned(&connection, "user::1", "Concert", 80.0, due, false);
        // Spent expenses never fire in the projection.
        create_planned(&connection, "user::1", "Paid already", 60.0, due, true);

        let points = service.calculate_projection("user::1", Some(7), today()).unwrap();

        assert_eq!(points[2].balance, 500.0);
        let firing = &points[3];
        assert_eq!(firing.date, due);
        assert_eq!(firing.balance, 420.0);
        let events = firing.events.as_ref().unwrap();
        assert_eq!(events.planned_expenses.len(), 1);
        assert_eq!(events.planned_expenses[0].label, "Concert");
        assert_eq!(points[6].balance, 420.0);
    }

    #[test]
    fn test_event_groups_on_shared_day() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 0.0);
        create_item(&connection, "user::1", RecurringKind::Income, "Salary", 2000.0, 25, Frequency::Monthly);
        create_item(&connection, "user::1", RecurringKind::Expense, "Rent", 800.0, 25, Frequency::Monthly);
        let due = NaiveDate::from_ymd_opt(2025, 7, 25).unwrap();
        create_planned(&connection, "user::1", "Gift", 50.0, due, false);

        let points = service.calculate_projection("user::1", Some(6), today()).unwrap();
        let firing = &points[5];
        assert_eq!(firing.balance, 1150.0);

        let events = firing.events.as_ref().unwrap();
        assert_eq!(events.incomes.len(), 1);
        assert_eq!(events.expenses.len(), 1);
        assert_eq!(events.planned_expenses.len(), 1);
    }

    #[test]
    fn test_crosses_month_boundary() {
        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 0.0);
        create_item(&connection, "user::1", RecurringKind::Income, "Salary", 1000.0, 1, Frequency::Monthly);

        // 20 July + 12 days reaches 1 August; the salary fired on 1 July
        // already (in the base) and fires again on 1 August.
        let points = service.calculate_projection("user::1", Some(13), today()).unwrap();
        assert_eq!(points[0].balance, 1000.0);
        assert_eq!(points[11].balance, 1000.0);
        let august_first = &points[12];
        assert_eq!(august_first.date, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
        assert_eq!(august_first.balance, 2000.0);
    }

    #[test]
    fn test_adjustments_in_base_exclude_resets() {
        use crate::domain::models::{AdjustmentKind, BalanceAdjustment};
        use chrono::{TimeZone, Utc};

        let (service, connection, _temp_dir) = setup_test();
        create_settings(&connection, "user::1", 100.0);

        let repo = connection.create_adjustment_repository();
        repo.insert_adjustment(&BalanceAdjustment {
            id: "adjustment::1".to_string(),
            user_id: "user::1".to_string(),
            amount: 40.0,
            description: "Found cash".to_string(),
            kind: AdjustmentKind::ManualAdjustment,
            created_at: Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap(),
        })
        .unwrap();
        repo.insert_adjustment(&BalanceAdjustment {
            id: "adjustment::2".to_string(),
            user_id: "user::1".to_string(),
            amount: 5000.0,
            description: "Reset".to_string(),
            kind: AdjustmentKind::MonthlyReset,
            created_at: Utc.with_ymd_and_hms(2025, 7, 2, 0, 0, 0).unwrap(),
        })
        .unwrap();

        let points = service.calculate_projection("user::1", Some(1), today()).unwrap();
        assert_eq!(points[0].balance, 140.0);
    }
}
