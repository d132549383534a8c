//! Closing-price observation for one entity on one date.

use chrono::NaiveDate;
use serde::Serialize;

/// A single closing-price observation. Immutable once fetched; owned by the
/// external price source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub entity_id: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: Option<i64>,
}

impl PricePoint {
    pub fn new(entity_id: impl Into<String>, date: NaiveDate, close: f64) -> Self {
        PricePoint {
            entity_id: entity_id.into(),
            date,
            close,
            volume: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let p = PricePoint::new("NVO", date, 98.5);
        assert_eq!(p.entity_id, "NVO");
        assert_eq!(p.date, date);
        assert!((p.close - 98.5).abs() < f64::EPSILON);
        assert!(p.volume.is_none());
    }
}
