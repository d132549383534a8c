//! Benchmark index data port trait.

use crate::domain::benchmark::BenchmarkSeries;
use crate::domain::error::PicktrackError;

/// Read-only access to benchmark index price history.
pub trait BenchmarkSource {
    /// Full ordered price series for a benchmark ticker. An unknown ticker
    /// yields an empty series, not an error.
    fn series(&self, ticker: &str) -> Result<BenchmarkSeries, PicktrackError>;
}
