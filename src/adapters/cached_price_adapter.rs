//! Read-through price cache.
//!
//! Wraps any price source and memoizes lookups keyed by `(entity, date)`,
//! so repeated evaluations (simulation checkpoints, benchmark alignment)
//! hit the underlying source once. `invalidate` is the hook the operator
//! flow calls at the start of each recalculation run; there is no global
//! or time-based expiry. Single-threaded batch use, hence `RefCell`.

use crate::domain::error::PicktrackError;
use crate::domain::price::PricePoint;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct CachedPriceAdapter<P: PriceSource> {
    inner: P,
    dated: RefCell<HashMap<(String, NaiveDate), Option<PricePoint>>>,
    latest: RefCell<HashMap<String, Option<PricePoint>>>,
}

impl<P: PriceSource> CachedPriceAdapter<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            dated: RefCell::new(HashMap::new()),
            latest: RefCell::new(HashMap::new()),
        }
    }

    /// Drop all memoized lookups. Called once per recalculation run.
    pub fn invalidate(&self) {
        self.dated.borrow_mut().clear();
        self.latest.borrow_mut().clear();
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: PriceSource> PriceSource for CachedPriceAdapter<P> {
    fn price_on_or_before(
        &self,
        entity_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PricePoint>, PicktrackError> {
        let key = (entity_id.to_string(), date);
        if let Some(cached) = self.dated.borrow().get(&key) {
            return Ok(cached.clone());
        }

        // Errors are not cached; a retry must reach the source again.
        let fetched = self.inner.price_on_or_before(entity_id, date)?;
        self.dated.borrow_mut().insert(key, fetched.clone());
        Ok(fetched)
    }

    fn latest_price(&self, entity_id: &str) -> Result<Option<PricePoint>, PicktrackError> {
        if let Some(cached) = self.latest.borrow().get(entity_id) {
            return Ok(cached.clone());
        }

        let fetched = self.inner.latest_price(entity_id)?;
        self.latest
            .borrow_mut()
            .insert(entity_id.to_string(), fetched.clone());
        Ok(fetched)
    }
}
