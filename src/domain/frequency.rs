//! Frequency evaluation for recurring items.
//!
//! Pure date math: every function takes its reference date explicitly so the
//! answers are reproducible in tests. Nothing here touches storage or the
//! wall clock.

use chrono::{Datelike, NaiveDate};

use crate::domain::models::Frequency;

/// Months a quarterly item fires in when no explicit list is configured.
pub const DEFAULT_QUARTERLY_MONTHS: [u32; 4] = [1, 4, 7, 10];
/// Months a yearly item fires in when no explicit list is configured.
pub const DEFAULT_YEARLY_MONTHS: [u32; 1] = [1];

/// Whether a recurring item fires at all during the given calendar month.
///
/// One-time items are due only in the exact year and month of their date;
/// the item's day-of-month plays no part in the due check. Quarterly and
/// yearly items fire in their configured months, falling back to the
/// defaults above. Yearly items may list several months; the shape is not
/// restricted to one.
pub fn is_due_in_month(frequency: &Frequency, month: u32, year: i32) -> bool {
    match frequency {
        Frequency::OneTime { date } => date.year() == year && date.month() == month,
        Frequency::Monthly => true,
        Frequency::Quarterly { months } => month_listed(months, &DEFAULT_QUARTERLY_MONTHS, month),
        Frequency::Yearly { months } => month_listed(months, &DEFAULT_YEARLY_MONTHS, month),
    }
}

fn month_listed(months: &Option<Vec<u32>>, default: &[u32], month: u32) -> bool {
    match months {
        Some(configured) => configured.contains(&month),
        None => default.contains(&month),
    }
}

/// The amount a recurring item contributes to the current month's balance.
///
/// Non-cumulative, day-gated, current-month-only: the full `amount` counts
/// if and only if the item is due in `today`'s month and its day has already
/// been reached. There is no proration of quarterly or yearly amounts across
/// the months in between.
pub fn calculate_current_month_amount(
    amount: f64,
    frequency: &Frequency,
    day_of_month: u32,
    today: NaiveDate,
) -> f64 {
    if !is_due_in_month(frequency, today.month(), today.year()) {
        return 0.0;
    }
    if day_of_month <= today.day() {
        amount
    } else {
        0.0
    }
}

/// The next calendar date the item fires on, scanning forward from `today`
/// through the current and next year.
///
/// Returns `None` only for one-time items whose date has already passed.
/// Day values past a month's end clamp to the month's last day.
pub fn next_due_date(
    frequency: &Frequency,
    day_of_month: u32,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if let Frequency::OneTime { date } = frequency {
        return if *date >= today { Some(*date) } else { None };
    }

    let mut year = today.year();
    let mut month = today.month();
    for _ in 0..24 {
        if is_due_in_month(frequency, month, year) {
            let candidate = clamped_day_in_month(year, month, day_of_month);
            if candidate >= today {
                return Some(candidate);
            }
        }
        if month == 12 {
            month = 1;
            year += 1;
        } else {
            month += 1;
        }
    }
    None
}

/// Whether the item has fired at least once this calendar year, day-gated
/// the same way as the current-month contribution.
pub fn has_already_occurred_this_year(
    frequency: &Frequency,
    day_of_month: u32,
    today: NaiveDate,
) -> bool {
    (1..=today.month()).any(|month| {
        is_due_in_month(frequency, month, today.year())
            && (month < today.month() || day_of_month <= today.day())
    })
}

/// The date for `day` in the given month, clamped to the month's last day
/// when the month is shorter.
pub(crate) fn clamped_day_in_month(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| last_day_of_month(year, month))
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // The first of a month always exists and always has a predecessor.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .expect("valid month boundary")
}
