//! Trackable positions and their computed returns.

use chrono::NaiveDate;
use serde::Serialize;

/// An approved analysis turned into a trackable holding. The entry price is
/// fixed once resolved; the exit side is refreshed on every recalculation
/// and never overwritten historically (each run emits a new snapshot).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub entity_id: String,
    pub analyst: String,
    pub sector: Option<String>,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub board_approved: bool,
}

impl Position {
    /// Days between entry and `as_of`. Negative when entry is in the future.
    pub fn holding_days(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.entry_date).num_days()
    }
}

/// Derived return figures for one position. Recomputed on demand, always
/// reproducible from prices + the position; never the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnResult {
    pub entity_id: String,
    pub analyst: String,
    pub sector: Option<String>,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub current_price: f64,
    pub simple_return_pct: f64,
    /// Only present for holdings longer than a year.
    pub annualized_return_pct: Option<f64>,
    pub days_held: i64,
    pub board_approved: bool,
}

impl ReturnResult {
    /// The figure to display: annualized when available, raw otherwise.
    pub fn display_return(&self, annualized: bool) -> f64 {
        if annualized {
            self.annualized_return_pct.unwrap_or(self.simple_return_pct)
        } else {
            self.simple_return_pct
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position() -> Position {
        Position {
            entity_id: "NVO".into(),
            analyst: "Dana".into(),
            sector: Some("Healthcare".into()),
            entry_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            entry_price: 100.0,
            exit_date: None,
            exit_price: None,
            board_approved: true,
        }
    }

    #[test]
    fn holding_days_counts_calendar_days() {
        let pos = sample_position();
        let as_of = NaiveDate::from_ymd_opt(2023, 1, 25).unwrap();
        assert_eq!(pos.holding_days(as_of), 10);
    }

    #[test]
    fn holding_days_negative_for_future_entry() {
        let pos = sample_position();
        let as_of = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
        assert_eq!(pos.holding_days(as_of), -5);
    }

    #[test]
    fn display_return_falls_back_to_simple() {
        let result = ReturnResult {
            entity_id: "NVO".into(),
            analyst: "Dana".into(),
            sector: None,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            entry_price: 100.0,
            current_price: 112.0,
            simple_return_pct: 12.0,
            annualized_return_pct: None,
            days_held: 120,
            board_approved: false,
        };
        assert!((result.display_return(true) - 12.0).abs() < f64::EPSILON);
        assert!((result.display_return(false) - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_return_uses_annualized_when_present() {
        let result = ReturnResult {
            entity_id: "NVO".into(),
            analyst: "Dana".into(),
            sector: None,
            entry_date: NaiveDate::from_ymd_opt(2022, 1, 15).unwrap(),
            entry_price: 100.0,
            current_price: 150.0,
            simple_return_pct: 50.0,
            annualized_return_pct: Some(22.5),
            days_held: 730,
            board_approved: false,
        };
        assert!((result.display_return(true) - 22.5).abs() < f64::EPSILON);
        assert!((result.display_return(false) - 50.0).abs() < f64::EPSILON);
    }
}
