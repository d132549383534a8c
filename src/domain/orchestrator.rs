//! Recalculation run: feed + prices in, one snapshot out.
//!
//! Drives the return calculator, aggregation, portfolio simulation and
//! benchmark comparison for every eligible analysis. One position's failed
//! price lookup never aborts the run; the position is skipped and warned.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::analysis::{reject_future_records, StatusFilter};
use super::benchmark::{self, BenchmarkComparison};
use super::error::PicktrackError;
use super::position::{Position, ReturnResult};
use super::returns;
use super::simulator::{self, EntryEvent, SimulationPolicy};
use super::snapshot::{PerformanceSnapshot, RunStats, SkipWarning, WarningKind};
use super::stats::ReturnStats;
use crate::ports::benchmark_port::BenchmarkSource;
use crate::ports::feed_port::AnalysisFeed;
use crate::ports::price_port::PriceSource;

/// External lookups are retried this many times before the position is
/// skipped as missing.
pub const PRICE_FETCH_ATTEMPTS: usize = 3;

/// Parameters for one recalculation run, resolved by the caller from config
/// and CLI flags before the engine is invoked.
#[derive(Debug, Clone)]
pub struct RecalculationConfig {
    pub calculation_date: NaiveDate,
    pub status_filter: StatusFilter,
    pub policy: SimulationPolicy,
    pub base_value: f64,
    /// Benchmark tickers compared independently against the portfolio.
    pub benchmark_tickers: Vec<String>,
    /// Aggregate over annualized figures where the holding period allows.
    pub annualized: bool,
}

/// Run a full recalculation and emit one immutable snapshot.
///
/// Deterministic: identical frozen inputs produce an identical snapshot.
/// Records dated after the calculation date fail the run loudly; they
/// indicate an upstream data integrity problem.
pub fn run_recalculation(
    feed: &dyn AnalysisFeed,
    prices: &dyn PriceSource,
    benchmark_source: &dyn BenchmarkSource,
    config: &RecalculationConfig,
) -> Result<PerformanceSnapshot, PicktrackError> {
    let mut records: Vec<_> = feed
        .analyses()?
        .into_iter()
        .filter(|r| config.status_filter.matches(r.status))
        .collect();
    records.sort_by(|a, b| {
        a.entry_date()
            .cmp(&b.entry_date())
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });

    reject_future_records(&records, config.calculation_date)?;

    let mut results: Vec<ReturnResult> = Vec::with_capacity(records.len());
    let mut warnings: Vec<SkipWarning> = Vec::new();
    let mut run_stats = RunStats {
        total_records: records.len(),
        ..RunStats::default()
    };

    for record in &records {
        let entry_date = record.entry_date();

        let entry = fetch_with_retry(|| prices.price_on_or_before(&record.entity_id, entry_date));
        let entry = match entry {
            Some(point) => point,
            None => {
                run_stats.skipped_no_entry_price += 1;
                warnings.push(skip(record.entity_id.clone(), entry_date, WarningKind::MissingEntryPrice));
                continue;
            }
        };

        if entry.close <= 0.0 {
            run_stats.skipped_bad_entry_price += 1;
            warnings.push(skip(record.entity_id.clone(), entry_date, WarningKind::NonPositiveEntryPrice));
            continue;
        }

        let current = fetch_with_retry(|| prices.latest_price(&record.entity_id));
        let current = match current {
            Some(point) => point,
            None => {
                run_stats.skipped_no_current_price += 1;
                warnings.push(skip(record.entity_id.clone(), entry_date, WarningKind::MissingCurrentPrice));
                continue;
            }
        };

        // Entry price fixed at resolution; the exit side is refreshed on
        // every run.
        let position = Position {
            entity_id: record.entity_id.clone(),
            analyst: record.analyst.clone(),
            sector: record.sector.clone(),
            entry_date,
            entry_price: entry.close,
            exit_date: Some(current.date),
            exit_price: Some(current.close),
            board_approved: record.board_approved,
        };

        let simple = match returns::simple_return(position.entry_price, current.close) {
            Some(ret) => ret,
            None => {
                run_stats.skipped_bad_entry_price += 1;
                warnings.push(skip(record.entity_id.clone(), entry_date, WarningKind::NonPositiveEntryPrice));
                continue;
            }
        };

        let days_held = position.holding_days(config.calculation_date);
        let annualized = if days_held > 0 {
            returns::annualized_return(simple, days_held)?
        } else {
            None
        };

        run_stats.calculated += 1;
        results.push(ReturnResult {
            entity_id: position.entity_id,
            analyst: position.analyst,
            sector: position.sector,
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            current_price: current.close,
            simple_return_pct: simple,
            annualized_return_pct: annualized,
            days_held,
            board_approved: position.board_approved,
        });
    }

    let analyst_stats = group_stats(&results, config.annualized, |r| Some(r.analyst.clone()));
    let sector_stats = group_stats(&results, config.annualized, |r| {
        Some(r.sector.clone().unwrap_or_else(|| "Unknown".to_string()))
    });
    let overall_returns: Vec<f64> = results
        .iter()
        .map(|r| r.display_return(config.annualized))
        .collect();
    let overall_stats = ReturnStats::compute(&overall_returns);

    let portfolio_events: Vec<EntryEvent> = results
        .iter()
        .filter(|r| r.board_approved)
        .map(|r| EntryEvent {
            entity_id: r.entity_id.clone(),
            entry_date: r.entry_date,
            entry_price: r.entry_price,
        })
        .collect();

    let portfolio = match simulator::simulate(
        &portfolio_events,
        prices,
        config.policy,
        config.base_value,
        config.calculation_date,
    ) {
        Ok(series) => Some(series),
        Err(PicktrackError::NoPositions { .. }) => None,
        Err(other) => return Err(other),
    };

    let chart_dates: Vec<NaiveDate> = portfolio
        .as_ref()
        .map(|p| p.points.iter().map(|point| point.date).collect())
        .unwrap_or_default();

    let benchmarks = compare_benchmarks(
        benchmark_source,
        config,
        &portfolio_events,
        &results,
        portfolio.as_ref().map(|p| p.final_return_pct),
        overall_stats.as_ref().map(|s| s.mean),
        &chart_dates,
    )?;

    Ok(PerformanceSnapshot {
        calculation_date: config.calculation_date,
        policy: config.policy,
        results,
        analyst_stats,
        sector_stats,
        overall_stats,
        portfolio,
        benchmarks,
        warnings,
        run_stats,
    })
}

fn skip(entity_id: String, entry_date: NaiveDate, kind: WarningKind) -> SkipWarning {
    SkipWarning {
        entity_id,
        entry_date,
        kind,
    }
}

/// Retry an external lookup on transport errors. A lookup that keeps failing
/// is treated as missing data so the rest of the run can proceed.
fn fetch_with_retry<T>(
    mut lookup: impl FnMut() -> Result<Option<T>, PicktrackError>,
) -> Option<T> {
    for attempt in 1..=PRICE_FETCH_ATTEMPTS {
        match lookup() {
            Ok(found) => return found,
            Err(_) if attempt < PRICE_FETCH_ATTEMPTS => continue,
            Err(_) => return None,
        }
    }
    None
}

fn group_stats(
    results: &[ReturnResult],
    annualized: bool,
    key: impl Fn(&ReturnResult) -> Option<String>,
) -> BTreeMap<String, ReturnStats> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for result in results {
        if let Some(group) = key(result) {
            groups
                .entry(group)
                .or_default()
                .push(result.display_return(annualized));
        }
    }

    groups
        .into_iter()
        .filter_map(|(name, rets)| ReturnStats::compute(&rets).map(|s| (name, s)))
        .collect()
}

/// Compare each configured benchmark over the window from the portfolio's
/// inception to the calculation date. A benchmark with a data gap at either
/// endpoint reports `None` rather than a substitute figure.
fn compare_benchmarks(
    source: &dyn BenchmarkSource,
    config: &RecalculationConfig,
    portfolio_events: &[EntryEvent],
    results: &[ReturnResult],
    portfolio_return: Option<f64>,
    overall_mean: Option<f64>,
    chart_dates: &[NaiveDate],
) -> Result<Vec<BenchmarkComparison>, PicktrackError> {
    let start = portfolio_events
        .iter()
        .map(|e| e.entry_date)
        .min()
        .or_else(|| results.iter().map(|r| r.entry_date).min());

    let Some(start_date) = start else {
        return Ok(Vec::new());
    };
    let reference_return = portfolio_return.or(overall_mean);

    let mut comparisons = Vec::with_capacity(config.benchmark_tickers.len());
    for ticker in &config.benchmark_tickers {
        let series = source.series(ticker)?;
        let return_pct = benchmark::benchmark_return(&series, start_date, config.calculation_date);
        comparisons.push(BenchmarkComparison {
            ticker: ticker.clone(),
            return_pct,
            alpha_pct: benchmark::alpha(reference_return, return_pct),
            series: benchmark::cumulative_series(&series, start_date, chart_dates),
        });
    }
    Ok(comparisons)
}
