#![allow(dead_code)]

use chrono::NaiveDate;
use picktrack::domain::analysis::{AnalysisRecord, ApprovalStatus};
use picktrack::domain::benchmark::BenchmarkSeries;
use picktrack::domain::error::PicktrackError;
use picktrack::domain::price::PricePoint;
use picktrack::ports::benchmark_port::BenchmarkSource;
use picktrack::ports::feed_port::AnalysisFeed;
use picktrack::ports::price_port::PriceSource;
use std::cell::RefCell;
use std::collections::HashMap;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<(NaiveDate, f64)>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, entity: &str, quotes: &[(&str, f64)]) -> Self {
        let mut series: Vec<(NaiveDate, f64)> = quotes.iter().map(|(d, p)| (date(d), *p)).collect();
        series.sort_by_key(|(d, _)| *d);
        self.data.insert(entity.to_string(), series);
        self
    }

    pub fn with_error(mut self, entity: &str, reason: &str) -> Self {
        self.errors.insert(entity.to_string(), reason.to_string());
        self
    }

    fn check_error(&self, entity_id: &str) -> Result<(), PicktrackError> {
        if let Some(reason) = self.errors.get(entity_id) {
            return Err(PicktrackError::PriceData {
                reason: reason.clone(),
            });
        }
        Ok(())
    }
}

impl PriceSource for MockPriceSource {
    fn price_on_or_before(
        &self,
        entity_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PricePoint>, PicktrackError> {
        self.check_error(entity_id)?;
        Ok(self.data.get(entity_id).and_then(|series| {
            series
                .iter()
                .rev()
                .find(|(d, _)| *d <= date)
                .map(|(d, p)| PricePoint::new(entity_id, *d, *p))
        }))
    }

    fn latest_price(&self, entity_id: &str) -> Result<Option<PricePoint>, PicktrackError> {
        self.check_error(entity_id)?;
        Ok(self.data.get(entity_id).and_then(|series| {
            series
                .last()
                .map(|(d, p)| PricePoint::new(entity_id, *d, *p))
        }))
    }
}

impl BenchmarkSource for MockPriceSource {
    fn series(&self, ticker: &str) -> Result<BenchmarkSeries, PicktrackError> {
        self.check_error(ticker)?;
        let points = self
            .data
            .get(ticker)
            .map(|series| {
                series
                    .iter()
                    .map(|(d, p)| PricePoint::new(ticker, *d, *p))
                    .collect()
            })
            .unwrap_or_default();
        Ok(BenchmarkSeries::new(ticker, points))
    }
}

/// Price source that fails a fixed number of times per entity before
/// delegating, for exercising lookup retries.
pub struct FlakyPriceSource {
    pub inner: MockPriceSource,
    pub failures_before_success: usize,
    pub attempts: RefCell<HashMap<String, usize>>,
}

impl FlakyPriceSource {
    pub fn new(inner: MockPriceSource, failures_before_success: usize) -> Self {
        Self {
            inner,
            failures_before_success,
            attempts: RefCell::new(HashMap::new()),
        }
    }

    fn maybe_fail(&self, entity_id: &str) -> Result<(), PicktrackError> {
        let mut attempts = self.attempts.borrow_mut();
        let count = attempts.entry(entity_id.to_string()).or_insert(0);
        *count += 1;
        if *count <= self.failures_before_success {
            return Err(PicktrackError::PriceData {
                reason: format!("transient failure {} for {}", count, entity_id),
            });
        }
        Ok(())
    }
}

impl PriceSource for FlakyPriceSource {
    fn price_on_or_before(
        &self,
        entity_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PricePoint>, PicktrackError> {
        self.maybe_fail(entity_id)?;
        self.inner.price_on_or_before(entity_id, date)
    }

    fn latest_price(&self, entity_id: &str) -> Result<Option<PricePoint>, PicktrackError> {
        self.maybe_fail(entity_id)?;
        self.inner.latest_price(entity_id)
    }
}

pub struct MockFeed {
    pub records: Vec<AnalysisRecord>,
}

impl MockFeed {
    pub fn new(records: Vec<AnalysisRecord>) -> Self {
        Self { records }
    }
}

impl AnalysisFeed for MockFeed {
    fn analyses(&self) -> Result<Vec<AnalysisRecord>, PicktrackError> {
        Ok(self.records.clone())
    }
}

pub fn make_record(entity: &str, analyst: &str, decision_date: &str) -> AnalysisRecord {
    AnalysisRecord {
        entity_id: entity.to_string(),
        analyst: analyst.to_string(),
        sector: None,
        decision_date: date(decision_date),
        status: ApprovalStatus::Approved,
        board_approved: false,
        purchase_date: None,
    }
}

pub fn make_board_record(entity: &str, analyst: &str, decision_date: &str) -> AnalysisRecord {
    AnalysisRecord {
        board_approved: true,
        ..make_record(entity, analyst, decision_date)
    }
}
