//! Analysis feed port trait.

use crate::domain::analysis::AnalysisRecord;
use crate::domain::error::PicktrackError;

/// Ordered sequence of club analyses, produced by the external ingestion
/// pipeline (CSV/Notion import, ticker resolution, voting).
pub trait AnalysisFeed {
    /// All analyses, ordered by decision date ascending.
    fn analyses(&self) -> Result<Vec<AnalysisRecord>, PicktrackError>;
}
