//! CSV file price adapter.
//!
//! One file per entity in the base directory, named `<ENTITY>.csv` with
//! columns `date,close,volume` (volume optional). Doubles as the benchmark
//! source: benchmark tickers are just entities with their own files.

use crate::domain::benchmark::BenchmarkSeries;
use crate::domain::error::PicktrackError;
use crate::domain::price::PricePoint;
use crate::ports::benchmark_port::BenchmarkSource;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, entity_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", entity_id))
    }

    /// Full sorted price history for an entity. A missing file means the
    /// entity simply has no data (expected for delistings and new picks);
    /// a malformed file is an error.
    fn load_series(&self, entity_id: &str) -> Result<Vec<PricePoint>, PicktrackError> {
        let path = self.csv_path(entity_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| PicktrackError::PriceData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| PicktrackError::PriceData {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| PicktrackError::PriceData {
                reason: format!("missing date column in {}", path.display()),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                PicktrackError::PriceData {
                    reason: format!("invalid date in {}: {}", path.display(), e),
                }
            })?;

            let close: f64 = record
                .get(1)
                .ok_or_else(|| PicktrackError::PriceData {
                    reason: format!("missing close column in {}", path.display()),
                })?
                .parse()
                .map_err(|e| PicktrackError::PriceData {
                    reason: format!("invalid close value in {}: {}", path.display(), e),
                })?;

            let volume = match record.get(2) {
                Some(v) if !v.trim().is_empty() => {
                    Some(v.parse().map_err(|e| PicktrackError::PriceData {
                        reason: format!("invalid volume value in {}: {}", path.display(), e),
                    })?)
                }
                _ => None,
            };

            points.push(PricePoint {
                entity_id: entity_id.to_string(),
                date,
                close,
                volume,
            });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    /// Entities with a price file, sorted. Used by the `info` command.
    pub fn list_entities(&self) -> Result<Vec<String>, PicktrackError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| PicktrackError::PriceData {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut entities = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PicktrackError::PriceData {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(entity) = name_str.strip_suffix(".csv") {
                entities.push(entity.to_string());
            }
        }

        entities.sort();
        Ok(entities)
    }

    /// (first date, last date, observation count) for an entity.
    pub fn data_range(
        &self,
        entity_id: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PicktrackError> {
        let points = self.load_series(entity_id)?;
        match (points.first(), points.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, points.len()))),
            _ => Ok(None),
        }
    }
}

impl PriceSource for CsvPriceAdapter {
    fn price_on_or_before(
        &self,
        entity_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PricePoint>, PicktrackError> {
        let points = self.load_series(entity_id)?;
        Ok(points.into_iter().rev().find(|p| p.date <= date))
    }

    fn latest_price(&self, entity_id: &str) -> Result<Option<PricePoint>, PicktrackError> {
        let points = self.load_series(entity_id)?;
        Ok(points.into_iter().last())
    }
}

impl BenchmarkSource for CsvPriceAdapter {
    fn series(&self, ticker: &str) -> Result<BenchmarkSeries, PicktrackError> {
        Ok(BenchmarkSeries::new(ticker, self.load_series(ticker)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,close,volume\n\
            2024-01-15,100.0,50000\n\
            2024-01-16,105.5,60000\n\
            2024-01-19,103.0,55000\n";
        fs::write(path.join("NVO.csv"), csv_content).unwrap();

        // No volume column.
        fs::write(
            path.join("SPY.csv"),
            "date,close\n2024-01-15,400.0\n2024-01-19,410.0\n",
        )
        .unwrap();

        fs::write(path.join("EMPTY.csv"), "date,close,volume\n").unwrap();

        (dir, path)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn price_on_or_before_exact_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let point = adapter
            .price_on_or_before("NVO", date("2024-01-16"))
            .unwrap()
            .unwrap();
        assert_eq!(point.date, date("2024-01-16"));
        assert_eq!(point.close, 105.5);
        assert_eq!(point.volume, Some(60000));
    }

    #[test]
    fn price_on_or_before_falls_back_over_weekend() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        // The 17th and 18th have no observations.
        let point = adapter
            .price_on_or_before("NVO", date("2024-01-18"))
            .unwrap()
            .unwrap();
        assert_eq!(point.date, date("2024-01-16"));
    }

    #[test]
    fn price_before_history_is_none() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);
        let point = adapter.price_on_or_before("NVO", date("2024-01-14")).unwrap();
        assert!(point.is_none());
    }

    #[test]
    fn missing_file_is_missing_data_not_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);
        assert!(adapter
            .price_on_or_before("UNKNOWN", date("2024-01-16"))
            .unwrap()
            .is_none());
        assert!(adapter.latest_price("UNKNOWN").unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("BAD.csv"), "date,close\nnot-a-date,oops\n").unwrap();
        let adapter = CsvPriceAdapter::new(path);
        assert!(adapter.latest_price("BAD").is_err());
    }

    #[test]
    fn latest_price_returns_newest() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);
        let point = adapter.latest_price("NVO").unwrap().unwrap();
        assert_eq!(point.date, date("2024-01-19"));
        assert_eq!(point.close, 103.0);
    }

    #[test]
    fn missing_volume_column_is_accepted() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);
        let point = adapter.latest_price("SPY").unwrap().unwrap();
        assert_eq!(point.volume, None);
    }

    #[test]
    fn benchmark_series_loads_sorted() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);
        let series = adapter.series("SPY").unwrap();
        assert_eq!(series.ticker, "SPY");
        assert_eq!(series.points.len(), 2);
        assert!(series.points[0].date < series.points[1].date);
    }

    #[test]
    fn benchmark_series_missing_ticker_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);
        assert!(adapter.series("QQQ").unwrap().is_empty());
    }

    #[test]
    fn list_entities_sorted() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);
        assert_eq!(adapter.list_entities().unwrap(), vec!["EMPTY", "NVO", "SPY"]);
    }

    #[test]
    fn data_range_spans_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);
        let range = adapter.data_range("NVO").unwrap().unwrap();
        assert_eq!(range, (date("2024-01-15"), date("2024-01-19"), 3));
        assert!(adapter.data_range("EMPTY").unwrap().is_none());
    }
}
