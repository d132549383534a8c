//! File-owned last-recalculation state.
//!
//! A single file holding the date of the last completed run. The CLI reads
//! it once to decide whether a scheduled run is due and writes it once after
//! a successful run; no module-level mutable state exists.

use crate::domain::error::PicktrackError;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct FileRunState {
    path: PathBuf,
}

impl FileRunState {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Date of the last completed run, if any.
    pub fn last_run(&self) -> Result<Option<NaiveDate>, PicktrackError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| {
            PicktrackError::RunState {
                reason: format!("corrupt run state {}: {}", self.path.display(), e),
            }
        })?;
        Ok(Some(date))
    }

    pub fn record_run(&self, date: NaiveDate) -> Result<(), PicktrackError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{}\n", date))?;
        Ok(())
    }

    /// Whether a scheduled run is due: no previous run, or the last run is
    /// at least `interval_days` old.
    pub fn is_due(&self, today: NaiveDate, interval_days: i64) -> Result<bool, PicktrackError> {
        match self.last_run()? {
            None => Ok(true),
            Some(last) => Ok((today - last).num_days() >= interval_days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn missing_file_means_never_run() {
        let dir = TempDir::new().unwrap();
        let state = FileRunState::new(dir.path().join("last_run"));
        assert_eq!(state.last_run().unwrap(), None);
        assert!(state.is_due(date("2024-03-01"), 7).unwrap());
    }

    #[test]
    fn record_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let state = FileRunState::new(dir.path().join("last_run"));
        state.record_run(date("2024-03-01")).unwrap();
        assert_eq!(state.last_run().unwrap(), Some(date("2024-03-01")));
    }

    #[test]
    fn due_only_after_interval() {
        let dir = TempDir::new().unwrap();
        let state = FileRunState::new(dir.path().join("last_run"));
        state.record_run(date("2024-03-01")).unwrap();

        assert!(!state.is_due(date("2024-03-05"), 7).unwrap());
        assert!(state.is_due(date("2024-03-08"), 7).unwrap());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let state = FileRunState::new(dir.path().join("state").join("last_run"));
        state.record_run(date("2024-03-01")).unwrap();
        assert_eq!(state.last_run().unwrap(), Some(date("2024-03-01")));
    }

    #[test]
    fn corrupt_state_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_run");
        fs::write(&path, "last week sometime\n").unwrap();
        let state = FileRunState::new(path);
        assert!(state.last_run().is_err());
    }
}
