//! Snapshot storage port trait.

use crate::domain::error::PicktrackError;
use crate::domain::snapshot::PerformanceSnapshot;
use std::path::Path;

/// Port for handing a finished snapshot to the external storage collaborator.
/// Snapshots are append-only; implementations must never rewrite history.
pub trait SnapshotPort {
    fn write(
        &self,
        snapshot: &PerformanceSnapshot,
        output_dir: &Path,
    ) -> Result<std::path::PathBuf, PicktrackError>;
}
