//! Immutable output of one recalculation run.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::benchmark::BenchmarkComparison;
use super::position::ReturnResult;
use super::simulator::{PortfolioSeries, SimulationPolicy};
use super::stats::ReturnStats;

/// Why a position was skipped. Expected, common conditions recorded for
/// operator visibility, never raised as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    MissingEntryPrice,
    MissingCurrentPrice,
    NonPositiveEntryPrice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipWarning {
    pub entity_id: String,
    pub entry_date: NaiveDate,
    pub kind: WarningKind,
}

impl std::fmt::Display for SkipWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self.kind {
            WarningKind::MissingEntryPrice => "no price at entry date",
            WarningKind::MissingCurrentPrice => "no current price",
            WarningKind::NonPositiveEntryPrice => "entry price not positive",
        };
        write!(f, "{} ({}): {}", self.entity_id, self.entry_date, reason)
    }
}

/// Counts for one run, mirrored to the operator after recalculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub total_records: usize,
    pub calculated: usize,
    pub skipped_no_entry_price: usize,
    pub skipped_no_current_price: usize,
    pub skipped_bad_entry_price: usize,
}

/// One recalculation's complete output. Append-only historical record: a new
/// run produces a new snapshot dated with its own calculation date, and
/// identical inputs reproduce an identical snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSnapshot {
    pub calculation_date: NaiveDate,
    pub policy: SimulationPolicy,
    /// One entry per calculable position, ordered by entry date then entity.
    pub results: Vec<ReturnResult>,
    /// Sorted maps keep serialization deterministic across runs.
    pub analyst_stats: BTreeMap<String, ReturnStats>,
    pub sector_stats: BTreeMap<String, ReturnStats>,
    pub overall_stats: Option<ReturnStats>,
    /// Simulation over board-approved positions; absent when none resolve.
    pub portfolio: Option<PortfolioSeries>,
    pub benchmarks: Vec<BenchmarkComparison>,
    pub warnings: Vec<SkipWarning>,
    pub run_stats: RunStats,
}

impl PerformanceSnapshot {
    /// Returns for one analyst, using annualized figures where available.
    pub fn analyst_returns(&self, analyst: &str, annualized: bool) -> Vec<f64> {
        self.results
            .iter()
            .filter(|r| r.analyst == analyst)
            .map(|r| r.display_return(annualized))
            .collect()
    }
}
