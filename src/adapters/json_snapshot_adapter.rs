//! JSON snapshot writer.
//!
//! Serializes a snapshot to `snapshot-<calculation date>.json` in the output
//! directory. One file per calculation date; a rerun on the same date with
//! the same inputs rewrites an identical file, so history is never mutated.

use crate::domain::error::PicktrackError;
use crate::domain::snapshot::PerformanceSnapshot;
use crate::ports::snapshot_port::SnapshotPort;
use std::fs;
use std::path::{Path, PathBuf};

pub struct JsonSnapshotAdapter;

impl SnapshotPort for JsonSnapshotAdapter {
    fn write(
        &self,
        snapshot: &PerformanceSnapshot,
        output_dir: &Path,
    ) -> Result<PathBuf, PicktrackError> {
        fs::create_dir_all(output_dir)?;

        let path = output_dir.join(format!("snapshot-{}.json", snapshot.calculation_date));
        let json = serde_json::to_string_pretty(snapshot).map_err(|e| {
            PicktrackError::SnapshotWrite {
                reason: format!("serialization failed: {}", e),
            }
        })?;

        fs::write(&path, json).map_err(|e| PicktrackError::SnapshotWrite {
            reason: format!("failed to write {}: {}", path.display(), e),
        })?;
        Ok(path)
    }
}
