//! CSV analysis feed adapter.
//!
//! Reads the exported club analyses with columns
//! `entity_id,analyst,sector,decision_date,status,board_approved,purchase_date`.
//! Sector and purchase date may be empty.

use crate::domain::analysis::{AnalysisRecord, ApprovalStatus};
use crate::domain::error::PicktrackError;
use crate::ports::feed_port::AnalysisFeed;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvFeedAdapter {
    path: PathBuf,
}

impl CsvFeedAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn parse_record(
        &self,
        record: &csv::StringRecord,
        line: usize,
    ) -> Result<AnalysisRecord, PicktrackError> {
        let field = |idx: usize, name: &str| -> Result<String, PicktrackError> {
            record
                .get(idx)
                .map(|s| s.trim().to_string())
                .ok_or_else(|| PicktrackError::Feed {
                    reason: format!("{}: missing {} column at line {}", self.path.display(), name, line),
                })
        };

        let entity_id = field(0, "entity_id")?;
        if entity_id.is_empty() {
            return Err(PicktrackError::Feed {
                reason: format!("{}: empty entity_id at line {}", self.path.display(), line),
            });
        }

        let analyst = field(1, "analyst")?;
        let sector = match field(2, "sector")? {
            s if s.is_empty() => None,
            s => Some(s),
        };

        let decision_date = NaiveDate::parse_from_str(&field(3, "decision_date")?, "%Y-%m-%d")
            .map_err(|e| PicktrackError::Feed {
                reason: format!(
                    "{}: invalid decision_date at line {}: {}",
                    self.path.display(),
                    line,
                    e
                ),
            })?;

        let status: ApprovalStatus =
            field(4, "status")?
                .parse()
                .map_err(|reason| PicktrackError::Feed {
                    reason: format!("{}: line {}: {}", self.path.display(), line, reason),
                })?;

        let board_approved = matches!(
            field(5, "board_approved")?.to_lowercase().as_str(),
            "true" | "yes" | "1"
        );

        let purchase_date = match field(6, "purchase_date") {
            Ok(s) if !s.is_empty() => Some(
                NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| PicktrackError::Feed {
                    reason: format!(
                        "{}: invalid purchase_date at line {}: {}",
                        self.path.display(),
                        line,
                        e
                    ),
                })?,
            ),
            _ => None,
        };

        Ok(AnalysisRecord {
            entity_id,
            analyst,
            sector,
            decision_date,
            status,
            board_approved,
            purchase_date,
        })
    }
}

impl AnalysisFeed for CsvFeedAdapter {
    fn analyses(&self) -> Result<Vec<AnalysisRecord>, PicktrackError> {
        let content = fs::read_to_string(&self.path).map_err(|e| PicktrackError::Feed {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut records = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| PicktrackError::Feed {
                reason: format!("CSV parse error in {}: {}", self.path.display(), e),
            })?;
            // Header occupies line 1.
            records.push(self.parse_record(&record, idx + 2)?);
        }

        records.sort_by(|a, b| {
            a.decision_date
                .cmp(&b.decision_date)
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "entity_id,analyst,sector,decision_date,status,board_approved,purchase_date\n";

    fn write_feed(content: &str) -> (TempDir, CsvFeedAdapter) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analyses.csv");
        fs::write(&path, content).unwrap();
        (dir, CsvFeedAdapter::new(path))
    }

    #[test]
    fn parses_full_rows() {
        let (_dir, adapter) = write_feed(&format!(
            "{HEADER}NVO,Dana,Healthcare,2024-01-15,On Watchlist,yes,2024-02-01\n\
             ASML,Kim,Technology,2024-02-10,Neutral,no,\n"
        ));

        let records = adapter.analyses().unwrap();
        assert_eq!(records.len(), 2);

        let nvo = &records[0];
        assert_eq!(nvo.entity_id, "NVO");
        assert_eq!(nvo.analyst, "Dana");
        assert_eq!(nvo.sector.as_deref(), Some("Healthcare"));
        assert_eq!(nvo.status, ApprovalStatus::Approved);
        assert!(nvo.board_approved);
        assert_eq!(
            nvo.purchase_date,
            Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
        );

        let asml = &records[1];
        assert_eq!(asml.status, ApprovalStatus::Neutral);
        assert!(!asml.board_approved);
        assert!(asml.purchase_date.is_none());
        assert!(asml.sector.is_some());
    }

    #[test]
    fn sorts_by_decision_date() {
        let (_dir, adapter) = write_feed(&format!(
            "{HEADER}ZZZ,Kim,,2024-03-01,Approved,no,\n\
             AAA,Dana,,2024-01-01,Approved,no,\n"
        ));
        let records = adapter.analyses().unwrap();
        assert_eq!(records[0].entity_id, "AAA");
        assert_eq!(records[1].entity_id, "ZZZ");
    }

    #[test]
    fn empty_sector_becomes_none() {
        let (_dir, adapter) = write_feed(&format!("{HEADER}NVO,Dana,,2024-01-15,Approved,no,\n"));
        let records = adapter.analyses().unwrap();
        assert!(records[0].sector.is_none());
    }

    #[test]
    fn bad_date_is_an_error() {
        let (_dir, adapter) =
            write_feed(&format!("{HEADER}NVO,Dana,,15/01/2024,Approved,no,\n"));
        assert!(matches!(
            adapter.analyses(),
            Err(PicktrackError::Feed { .. })
        ));
    }

    #[test]
    fn unknown_status_is_an_error() {
        let (_dir, adapter) =
            write_feed(&format!("{HEADER}NVO,Dana,,2024-01-15,Maybe,no,\n"));
        let err = adapter.analyses().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let adapter = CsvFeedAdapter::new(PathBuf::from("/nonexistent/analyses.csv"));
        assert!(matches!(
            adapter.analyses(),
            Err(PicktrackError::Feed { .. })
        ));
    }

    #[test]
    fn empty_feed_is_ok() {
        let (_dir, adapter) = write_feed(HEADER);
        assert!(adapter.analyses().unwrap().is_empty());
    }
}
