//! Approved-analysis feed records and status filtering.

use chrono::NaiveDate;
use serde::Serialize;
use std::str::FromStr;

use super::error::PicktrackError;

/// Club decision recorded for an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApprovalStatus {
    /// Voted onto the watchlist.
    Approved,
    Neutral,
    Refused,
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approved" | "on watchlist" | "watchlist" => Ok(ApprovalStatus::Approved),
            "neutral" => Ok(ApprovalStatus::Neutral),
            "refused" => Ok(ApprovalStatus::Refused),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// Which statuses participate in an aggregate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusFilter {
    ApprovedOnly,
    ApprovedNeutral,
    AllStock,
}

impl StatusFilter {
    pub fn matches(&self, status: ApprovalStatus) -> bool {
        match self {
            StatusFilter::ApprovedOnly => status == ApprovalStatus::Approved,
            StatusFilter::ApprovedNeutral => status != ApprovalStatus::Refused,
            StatusFilter::AllStock => true,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approved_only" | "approved" => Ok(StatusFilter::ApprovedOnly),
            "approved_neutral" | "neutral_approved" => Ok(StatusFilter::ApprovedNeutral),
            "all_stock" | "all" => Ok(StatusFilter::AllStock),
            other => Err(format!("unknown status filter: {other}")),
        }
    }
}

/// One approved analysis as delivered by the external feed.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub entity_id: String,
    pub analyst: String,
    pub sector: Option<String>,
    pub decision_date: NaiveDate,
    pub status: ApprovalStatus,
    /// More yes than no votes at the club board.
    pub board_approved: bool,
    /// When the club actually bought; overrides the decision date as the
    /// position entry date.
    pub purchase_date: Option<NaiveDate>,
}

impl AnalysisRecord {
    pub fn approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }

    /// Purchase date when present, decision date otherwise.
    pub fn entry_date(&self) -> NaiveDate {
        self.purchase_date.unwrap_or(self.decision_date)
    }
}

/// Validate that no record is dated after `calculation_date`. Future-dated
/// records indicate an upstream data integrity problem and fail the run.
pub fn reject_future_records(
    records: &[AnalysisRecord],
    calculation_date: NaiveDate,
) -> Result<(), PicktrackError> {
    for record in records {
        let days = (calculation_date - record.entry_date()).num_days();
        if days < 0 {
            return Err(PicktrackError::InvalidPeriod { days });
        }
    }
    Ok(())
}
