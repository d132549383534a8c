//! Price source port trait.

use crate::domain::error::PicktrackError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

/// Access to closing prices owned by an external collaborator.
///
/// `Ok(None)` means the data genuinely does not exist (delisted entity, no
/// observation yet), an expected condition callers turn into a warning.
/// `Err` means the lookup itself failed and may be retried.
pub trait PriceSource {
    /// Closing price at the most recent observation on or before `date`.
    fn price_on_or_before(
        &self,
        entity_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PricePoint>, PicktrackError>;

    /// Most recent available closing price for the entity.
    fn latest_price(&self, entity_id: &str) -> Result<Option<PricePoint>, PicktrackError>;
}
