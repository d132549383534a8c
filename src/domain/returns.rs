//! Simple and annualized return calculation for one position.

use chrono::NaiveDate;

use super::error::PicktrackError;

/// Holding periods at or below this many days are reported unannualized.
pub const ANNUALIZATION_THRESHOLD_DAYS: i64 = 365;

/// Percentage return between entry and current price:
/// (current - entry) / entry * 100.
///
/// Returns `None` when the entry price is zero or negative; callers must
/// exclude such positions from aggregates rather than treating them as 0%.
pub fn simple_return(entry_price: f64, current_price: f64) -> Option<f64> {
    if entry_price <= 0.0 {
        return None;
    }
    Some((current_price - entry_price) / entry_price * 100.0)
}

/// One-year-equivalent return via compound growth:
/// ((1 + r/100)^(365/days) - 1) * 100.
///
/// Applied only when the holding period exceeds a year; shorter holdings get
/// `Ok(None)` and callers fall back to the raw return for display. A return
/// at or below -100% is clamped to exactly -100 before exponentiation so the
/// root is never taken of a negative base.
pub fn annualized_return(
    simple_return_pct: f64,
    days_held: i64,
) -> Result<Option<f64>, PicktrackError> {
    if days_held <= 0 {
        return Err(PicktrackError::InvalidPeriod { days: days_held });
    }
    if days_held <= ANNUALIZATION_THRESHOLD_DAYS {
        return Ok(None);
    }

    let clamped = simple_return_pct.max(-100.0);
    let total_growth = 1.0 + clamped / 100.0;
    let exponent = 365.0 / days_held as f64;
    Ok(Some((total_growth.powf(exponent) - 1.0) * 100.0))
}

/// Calendar days between entry and the evaluation date.
pub fn holding_days(entry_date: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - entry_date).num_days()
}
