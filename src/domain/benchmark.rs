//! Benchmark index series and excess-return comparison.

use chrono::NaiveDate;
use serde::Serialize;

use super::price::PricePoint;

/// Read-only price history for one benchmark index, sorted by date.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl BenchmarkSeries {
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        BenchmarkSeries {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing price at the most recent observation on or before `date`.
    pub fn price_on_or_before(&self, date: NaiveDate) -> Option<f64> {
        let idx = self.points.partition_point(|p| p.date <= date);
        if idx == 0 {
            None
        } else {
            Some(self.points[idx - 1].close)
        }
    }
}

/// Simple return of the benchmark between the at-or-before prices for
/// `start_date` and `end_date`. `None` when either endpoint is missing;
/// gaps are never forward-filled past the last observation.
pub fn benchmark_return(
    series: &BenchmarkSeries,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Option<f64> {
    let start = series.price_on_or_before(start_date)?;
    let end = series.price_on_or_before(end_date)?;
    if start <= 0.0 {
        return None;
    }
    Some((end - start) / start * 100.0)
}

/// Excess return of a position or portfolio over a benchmark. `None`
/// propagates from either side.
pub fn alpha(position_return: Option<f64>, benchmark_return: Option<f64>) -> Option<f64> {
    Some(position_return? - benchmark_return?)
}

/// Cumulative benchmark returns aligned to chart dates, normalized to the
/// at-or-before price for `start_date`. A date with no observation yet
/// yields `None` rather than a zero fill.
pub fn cumulative_series(
    series: &BenchmarkSeries,
    start_date: NaiveDate,
    dates: &[NaiveDate],
) -> Vec<Option<f64>> {
    let base = match series.price_on_or_before(start_date).filter(|&p| p > 0.0) {
        Some(base) => base,
        None => return vec![None; dates.len()],
    };

    dates
        .iter()
        .map(|&date| {
            series
                .price_on_or_before(date)
                .map(|price| (price - base) / base * 100.0)
        })
        .collect()
}

/// One benchmark compared against the portfolio over the same window.
/// Benchmarks are reported independently, never blended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkComparison {
    pub ticker: String,
    pub return_pct: Option<f64>,
    pub alpha_pct: Option<f64>,
    /// Cumulative returns aligned to the portfolio chart dates, for plotting
    /// the benchmark line next to the club portfolio.
    pub series: Vec<Option<f64>>,
}
