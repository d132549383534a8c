//! Club portfolio simulation over chronologically ordered entry events.
//!
//! Two non-equivalent policies, chosen explicitly by the caller:
//! incremental equal-weight rebalancing (a stateful replay that crystallizes
//! and redistributes value at every new entry) and simple equal-weighted
//! averaging (independent since-entry returns, no capital reallocation).

use chrono::{Months, NaiveDate};
use serde::Serialize;
use std::str::FromStr;

use super::error::PicktrackError;
use super::returns;
use crate::ports::price_port::PriceSource;

pub const DEFAULT_BASE_VALUE: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationPolicy {
    /// On each new entry, sell a fraction of every holding and split the
    /// portfolio value equally across all positions.
    IncrementalRebalance,
    /// Arithmetic mean of every active position's own since-entry return.
    EqualWeight,
}

impl FromStr for SimulationPolicy {
    type Err = PicktrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "incremental" | "rebalance" => Ok(SimulationPolicy::IncrementalRebalance),
            "equal" | "equal_weight" => Ok(SimulationPolicy::EqualWeight),
            other => Err(PicktrackError::UnknownPolicy {
                value: other.to_string(),
            }),
        }
    }
}

/// A position entering the simulated portfolio. Entry prices are resolved
/// before simulation; events with unresolvable prices never get this far.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryEvent {
    pub entity_id: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub cumulative_return_pct: f64,
}

/// Result of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSeries {
    pub policy: SimulationPolicy,
    pub base_value: f64,
    pub final_value: f64,
    pub final_return_pct: f64,
    pub points: Vec<SeriesPoint>,
}

/// Replay entry events and produce the cumulative portfolio series up to
/// `evaluation_date`. Events are sorted internally; the rebalancing policy
/// depends on strict chronological processing.
pub fn simulate(
    events: &[EntryEvent],
    prices: &dyn PriceSource,
    policy: SimulationPolicy,
    base_value: f64,
    evaluation_date: NaiveDate,
) -> Result<PortfolioSeries, PicktrackError> {
    let mut active: Vec<EntryEvent> = events
        .iter()
        .filter(|e| e.entry_date <= evaluation_date && e.entry_price > 0.0)
        .cloned()
        .collect();
    active.sort_by(|a, b| {
        a.entry_date
            .cmp(&b.entry_date)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });

    if active.is_empty() {
        return Err(PicktrackError::NoPositions {
            context: "portfolio simulation".to_string(),
        });
    }

    match policy {
        SimulationPolicy::IncrementalRebalance => {
            simulate_rebalancing(&active, prices, base_value, evaluation_date)
        }
        SimulationPolicy::EqualWeight => {
            simulate_equal_weight(&active, prices, base_value, evaluation_date)
        }
    }
}

struct SimPosition {
    entity_id: String,
    weight: f64,
    value: f64,
    last_price: f64,
}

/// Evolve each holding's value by its own price movement since the last
/// checkpoint. A position with no resolvable price keeps its last known
/// value (frozen) for this interval.
fn evolve_positions(
    positions: &mut [SimPosition],
    prices: &dyn PriceSource,
    date: NaiveDate,
) -> Result<(), PicktrackError> {
    for pos in positions.iter_mut() {
        if let Some(point) = prices.price_on_or_before(&pos.entity_id, date)? {
            if point.close > 0.0 && pos.last_price > 0.0 {
                pos.value *= point.close / pos.last_price;
                pos.last_price = point.close;
            }
        }
    }
    Ok(())
}

fn simulate_rebalancing(
    events: &[EntryEvent],
    prices: &dyn PriceSource,
    base_value: f64,
    evaluation_date: NaiveDate,
) -> Result<PortfolioSeries, PicktrackError> {
    let mut positions: Vec<SimPosition> = Vec::with_capacity(events.len());
    let mut points: Vec<SeriesPoint> = Vec::new();

    for event in events {
        if positions.is_empty() {
            positions.push(SimPosition {
                entity_id: event.entity_id.clone(),
                weight: 1.0,
                value: base_value,
                last_price: event.entry_price,
            });
            points.push(SeriesPoint {
                date: event.entry_date,
                cumulative_return_pct: 0.0,
            });
            continue;
        }

        evolve_positions(&mut positions, prices, event.entry_date)?;

        // Crystallize current values, then redistribute equally across all
        // holdings including the new one. Total value is unchanged by the
        // rebalance itself.
        let total: f64 = positions.iter().map(|p| p.value).sum();
        let count = positions.len() + 1;
        let share = total / count as f64;
        let weight = 1.0 / count as f64;

        for pos in positions.iter_mut() {
            pos.value = share;
            pos.weight = weight;
        }
        positions.push(SimPosition {
            entity_id: event.entity_id.clone(),
            weight,
            value: share,
            last_price: event.entry_price,
        });

        let weight_sum: f64 = positions.iter().map(|p| p.weight).sum();
        debug_assert!((weight_sum - 1.0).abs() < 1e-9);

        push_point(&mut points, event.entry_date, total, base_value);
    }

    evolve_positions(&mut positions, prices, evaluation_date)?;
    let final_value: f64 = positions.iter().map(|p| p.value).sum();
    push_point(&mut points, evaluation_date, final_value, base_value);

    Ok(PortfolioSeries {
        policy: SimulationPolicy::IncrementalRebalance,
        base_value,
        final_value,
        final_return_pct: (final_value - base_value) / base_value * 100.0,
        points,
    })
}

fn simulate_equal_weight(
    events: &[EntryEvent],
    prices: &dyn PriceSource,
    base_value: f64,
    evaluation_date: NaiveDate,
) -> Result<PortfolioSeries, PicktrackError> {
    let mut points = Vec::new();

    for date in chart_dates(events[0].entry_date, evaluation_date) {
        if let Some(mean) = mean_return_at(events, prices, date)? {
            points.push(SeriesPoint {
                date,
                cumulative_return_pct: mean,
            });
        }
    }

    let final_return_pct = match points.last() {
        Some(point) if point.date == evaluation_date => point.cumulative_return_pct,
        _ => mean_return_at(events, prices, evaluation_date)?.ok_or_else(|| {
            PicktrackError::NoPositions {
                context: "portfolio simulation".to_string(),
            }
        })?,
    };

    Ok(PortfolioSeries {
        policy: SimulationPolicy::EqualWeight,
        base_value,
        final_value: base_value * (1.0 + final_return_pct / 100.0),
        final_return_pct,
        points,
    })
}

/// Mean since-entry return across positions entered by `date`. Positions
/// without a resolvable price are excluded, never counted as 0%; `None`
/// when nothing resolves.
fn mean_return_at(
    events: &[EntryEvent],
    prices: &dyn PriceSource,
    date: NaiveDate,
) -> Result<Option<f64>, PicktrackError> {
    let mut rets = Vec::new();
    for event in events.iter().filter(|e| e.entry_date <= date) {
        if let Some(point) = prices.price_on_or_before(&event.entity_id, date)? {
            if let Some(ret) = returns::simple_return(event.entry_price, point.close) {
                rets.push(ret);
            }
        }
    }
    if rets.is_empty() {
        return Ok(None);
    }
    Ok(Some(rets.iter().sum::<f64>() / rets.len() as f64))
}

/// Monthly grid from the first entry through the evaluation date, always
/// ending at the evaluation date itself.
fn chart_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        match current.checked_add_months(Months::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }
    if dates.last() != Some(&end) {
        dates.push(end);
    }
    dates
}

fn push_point(points: &mut Vec<SeriesPoint>, date: NaiveDate, value: f64, base_value: f64) {
    let pct = (value - base_value) / base_value * 100.0;
    match points.last_mut() {
        Some(last) if last.date == date => last.cumulative_return_pct = pct,
        _ => points.push(SeriesPoint {
            date,
            cumulative_return_pct: pct,
        }),
    }
}
