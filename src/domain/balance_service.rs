//! Balance aggregation for the budget tracker.
//!
//! This service assembles the full balance snapshot a user sees: initial
//! balance, the adjustment ledger, gated recurring contributions, planned
//! expenses that already occurred, and the safety margin. Everything is
//! recomputed from storage on every call; nothing is cached.

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::balance::{
    AdjustBalanceCommand, AdjustBalanceResult, UpdateSettingsCommand, UpdateSettingsResult,
};
use crate::domain::error::{wrap_unexpected, DomainError};
use crate::domain::frequency;
use crate::domain::models::balance::round_to_cents;
use crate::domain::models::{
    AdjustmentKind, Alert, AlertKind, BalanceAdjustment, BalanceSnapshot, MonthlyTrend,
    RecurringKind, UserSettings,
};
use crate::storage::traits::{
    AdjustmentStorage, Connection, PlannedExpenseStorage, RecurringItemStorage, SettingsStorage,
};

/// How many adjustments the snapshot carries for display. The balance sum
/// always covers the full ledger.
const MAX_ADJUSTMENTS_DISPLAYED: usize = 50;

/// Service responsible for balance snapshots, manual adjustments, alerts
/// and the trends view.
#[derive(Clone)]
pub struct BalanceService<C: Connection> {
    settings_repository: C::SettingsRepository,
    recurring_repository: C::RecurringItemRepository,
    planned_expense_repository: C::PlannedExpenseRepository,
    adjustment_repository: C::AdjustmentRepository,
}

impl<C: Connection> BalanceService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            settings_repository: connection.create_settings_repository(),
            recurring_repository: connection.create_recurring_item_repository(),
            planned_expense_repository: connection.create_planned_expense_repository(),
            adjustment_repository: connection.create_adjustment_repository(),
        }
    }

    /// Compute the current balance snapshot for a user as of `today`.
    pub fn calculate_balance(&self, user_id: &str, today: NaiveDate) -> Result<BalanceSnapshot> {
        self.calculate_balance_inner(user_id, today).map_err(|e| {
            wrap_unexpected(e, DomainError::BalanceCalculationFailed, "balance calculation")
        })
    }

    fn calculate_balance_inner(&self, user_id: &str, today: NaiveDate) -> Result<BalanceSnapshot> {
        let settings = self.get_required_settings(user_id)?;

        let mut current_balance = settings.initial_balance;

        let adjustments = self.adjustment_repository.list_adjustments(user_id)?;
        for adjustment in &adjustments {
            // Reset entries stay out of the running sum; the gated recurring
            // pass below already books the current month. The reset
            // orchestrator's net-change booking is coupled to this filter.
            if adjustment.kind != AdjustmentKind::MonthlyReset {
                current_balance += adjustment.amount;
            }
        }

        let mut total_income = 0.0;
        for item in self.recurring_repository.list_items(user_id, RecurringKind::Income)? {
            let contribution = frequency::calculate_current_month_amount(
                item.amount,
                &item.frequency,
                item.day_of_month,
                today,
            );
            current_balance += contribution;
            total_income += contribution;
        }

        let mut total_expenses = 0.0;
        for item in self.recurring_repository.list_items(user_id, RecurringKind::Expense)? {
            let contribution = frequency::calculate_current_month_amount(
                item.amount,
                &item.frequency,
                item.day_of_month,
                today,
            );
            current_balance -= contribution;
            total_expenses += contribution;
        }

        // total_planned is informational and counts every planned expense;
        // only unspent ones whose date has passed hit the balance.
        let mut total_planned = 0.0;
        for expense in self.planned_expense_repository.list_planned_expenses(user_id, true)? {
            total_planned += expense.amount;
            if !expense.spent && expense.date <= today {
                current_balance -= expense.amount;
            }
        }

        let margin_amount = current_balance * settings.margin_pct / 100.0;
        let projected_balance = current_balance - margin_amount;

        info!(
            "Balance for {}: {:.2} (income {:.2}, expenses {:.2}, planned {:.2}, margin {:.2})",
            user_id, projected_balance, total_income, total_expenses, total_planned, margin_amount
        );

        let display_adjustments = adjustments
            .into_iter()
            .take(MAX_ADJUSTMENTS_DISPLAYED)
            .collect();

        Ok(BalanceSnapshot {
            current_balance: round_to_cents(projected_balance),
            total_income: round_to_cents(total_income),
            total_expenses: round_to_cents(total_expenses),
            total_planned: round_to_cents(total_planned),
            projected_balance: round_to_cents(projected_balance),
            margin_amount: round_to_cents(margin_amount),
            adjustments: display_adjustments,
        })
    }

    /// Record a manual adjustment or correction and return the fresh snapshot.
    pub fn adjust_balance(
        &self,
        command: AdjustBalanceCommand,
        today: NaiveDate,
    ) -> Result<AdjustBalanceResult> {
        info!("Adjusting balance: {:?}", command);

        if command.description.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "Adjustment description cannot be empty".to_string(),
            )
            .into());
        }
        if !command.amount.is_finite() {
            return Err(DomainError::InvalidInput(
                "Adjustment amount must be a finite number".to_string(),
            )
            .into());
        }
        if command.kind == AdjustmentKind::MonthlyReset {
            return Err(DomainError::InvalidInput(
                "Monthly reset adjustments are booked by the reset operation".to_string(),
            )
            .into());
        }

        // Surface UserNotFound before touching the ledger.
        self.get_required_settings(&command.user_id)?;

        let adjustment = BalanceAdjustment {
            id: BalanceAdjustment::generate_id(),
            user_id: command.user_id.clone(),
            amount: command.amount,
            description: command.description.trim().to_string(),
            kind: command.kind,
            created_at: Utc::now(),
        };
        self.adjustment_repository.insert_adjustment(&adjustment)?;

        let balance = self.calculate_balance(&command.user_id, today)?;

        Ok(AdjustBalanceResult {
            adjustment,
            balance,
            success_message: "Balance adjustment recorded".to_string(),
        })
    }

    /// Minimal alerting: one alert when the current balance is negative.
    pub fn get_alerts(&self, user_id: &str, today: NaiveDate) -> Result<Vec<Alert>> {
        let snapshot = self.calculate_balance(user_id, today)?;

        let mut alerts = Vec::new();
        if snapshot.current_balance < 0.0 {
            warn!("User {} has a negative balance: {:.2}", user_id, snapshot.current_balance);
            alerts.push(Alert {
                kind: AlertKind::NegativeBalance,
                message: format!(
                    "Current balance is negative (${:.2})",
                    snapshot.current_balance
                ),
            });
        }

        Ok(alerts)
    }

    /// Synthetic monthly trend entries, oldest first.
    ///
    /// Every entry repeats the present-day totals; there is no historical
    /// snapshot storage behind this view.
    pub fn get_monthly_trends(
        &self,
        user_id: &str,
        months: u32,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyTrend>> {
        let snapshot = self.calculate_balance(user_id, today)?;

        let mut trends = Vec::with_capacity(months as usize);
        let mut year = today.year();
        let mut month = today.month();
        for _ in 0..months {
            trends.push(MonthlyTrend {
                year,
                month,
                total_income: snapshot.total_income,
                total_expenses: snapshot.total_expenses,
                net: round_to_cents(snapshot.total_income - snapshot.total_expenses),
            });
            if month == 1 {
                month = 12;
                year -= 1;
            } else {
                month -= 1;
            }
        }
        trends.reverse();
        Ok(trends)
    }

    /// Create or update the user's budget settings.
    pub fn update_settings(&self, command: UpdateSettingsCommand) -> Result<UpdateSettingsResult> {
        info!("Updating settings: {:?}", command);

        if let Some(initial_balance) = command.initial_balance {
            if !initial_balance.is_finite() {
                return Err(DomainError::InvalidInput(
                    "Initial balance must be a finite number".to_string(),
                )
                .into());
            }
        }
        if let Some(margin_pct) = command.margin_pct {
            if !UserSettings::is_valid_margin_pct(margin_pct) {
                return Err(DomainError::InvalidInput(format!(
                    "Margin percentage must be between 0 and 50, got {}",
                    margin_pct
                ))
                .into());
            }
        }
        if let Some(month_start_day) = command.month_start_day {
            if !UserSettings::is_valid_month_start_day(month_start_day) {
                return Err(DomainError::InvalidInput(format!(
                    "Month start day must be between 1 and 31, got {}",
                    month_start_day
                ))
                .into());
            }
        }

        let now = Utc::now().to_rfc3339();
        let mut settings = match self.settings_repository.get_settings(&command.user_id)? {
            Some(existing) => existing,
            None => UserSettings {
                user_id: command.user_id.clone(),
                initial_balance: 0.0,
                margin_pct: 0.0,
                month_start_day: 1,
                created_at: now.clone(),
                updated_at: now.clone(),
            },
        };

        if let Some(initial_balance) = command.initial_balance {
            settings.initial_balance = initial_balance;
        }
        if let Some(margin_pct) = command.margin_pct {
            settings.margin_pct = margin_pct;
        }
        if let Some(month_start_day) = command.month_start_day {
            settings.month_start_day = month_start_day;
        }
        settings.updated_at = now;

        self.settings_repository.store_settings(&settings)?;

        Ok(UpdateSettingsResult {
            settings,
            success_message: "Budget settings updated".to_string(),
        })
    }

    fn get_required_settings(&self, user_id: &str) -> Result<UserSettings> {
        self.settings_repository
            .get_settings(user_id)?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()).into())
    }
}
