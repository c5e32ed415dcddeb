use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::FetchTarget;
use crate::error::Result;
use crate::models::CandleDataset;

/// Identifies one run's output: product, period and the covered time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetKey {
    pub product: String,
    pub period: u32,
    pub start_millis: i64,
    pub end_millis: i64,
}

impl DatasetKey {
    /// Uses the oldest and newest candles observed. An empty dataset falls
    /// back to the requested boundaries, with `now` standing in for the
    /// missing ones.
    pub fn for_run(target: &FetchTarget, dataset: &CandleDataset, now: DateTime<Utc>) -> Self {
        let (start, end) = dataset
            .time_span()
            .unwrap_or((target.start.unwrap_or(now), target.end.unwrap_or(now)));
        Self {
            product: target.product.clone(),
            period: target.granularity.period(),
            start_millis: start.timestamp_millis(),
            end_millis: end.timestamp_millis(),
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "dataset_{}_{}_{}-{}.json",
            self.product, self.period, self.start_millis, self.end_millis
        )
    }
}

/// `requested` as is, or the default file name inside it when it is a
/// directory, or the default file name in the working directory.
pub fn resolve_output_path(requested: Option<&Path>, key: &DatasetKey) -> PathBuf {
    match requested {
        Some(dir) if dir.is_dir() => dir.join(key.file_name()),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(key.file_name()),
    }
}

pub fn write_dataset(path: &Path, dataset: &CandleDataset) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, dataset)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::ExchangeSimulator;
    use crate::models::{Candle, Granularity};
    use chrono::TimeZone;

    fn target() -> FetchTarget {
        FetchTarget {
            product: "BTC-USD".to_string(),
            granularity: Granularity::FiveMinutes,
            start: Some(Utc.with_ymd_and_hms(2017, 11, 1, 0, 0, 0).unwrap()),
            end: None,
        }
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_key_from_observed_candles() {
        let oldest = DateTime::from_timestamp(1_509_494_400, 0).unwrap();
        let mut dataset = CandleDataset::new();
        dataset.push_batch(ExchangeSimulator::batch_from(oldest, Granularity::FiveMinutes, 4));

        let key = DatasetKey::for_run(&target(), &dataset, Utc::now());
        assert_eq!(key.start_millis, 1_509_494_400_000);
        assert_eq!(key.end_millis, 1_509_495_300_000);
        assert_eq!(
            key.file_name(),
            "dataset_BTC-USD_300_1509494400000-1509495300000.json"
        );
    }

    #[test]
    fn test_key_for_empty_dataset_uses_requested_bounds() {
        let now = Utc.with_ymd_and_hms(2017, 12, 1, 0, 0, 0).unwrap();
        let key = DatasetKey::for_run(&target(), &CandleDataset::new(), now);
        assert_eq!(key.start_millis, 1_509_494_400_000);
        assert_eq!(key.end_millis, now.timestamp_millis());
    }

    #[test]
    fn test_resolve_output_path() {
        let key = DatasetKey::for_run(&target(), &CandleDataset::new(), Utc::now());
        let dir = std::env::temp_dir();

        assert_eq!(resolve_output_path(None, &key), PathBuf::from(key.file_name()));
        assert_eq!(resolve_output_path(Some(dir.as_path()), &key), dir.join(key.file_name()));
        let file = dir.join("candles.json");
        assert_eq!(resolve_output_path(Some(file.as_path()), &key), file);
    }

    #[test]
    fn test_write_empty_dataset() {
        let path = scratch_path("empty.json");
        write_dataset(&path, &CandleDataset::new()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_write_then_read_back() {
        let oldest = DateTime::from_timestamp(1_509_494_400, 0).unwrap();
        let mut dataset = CandleDataset::new();
        dataset.push_batch(ExchangeSimulator::batch_from(oldest, Granularity::OneMinute, 3));
        dataset.push_batch(Vec::new());
        let path = scratch_path("dataset.json");

        write_dataset(&path, &dataset).unwrap();
        let read: Vec<Candle> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(read, dataset.candles().copied().collect::<Vec<_>>());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let path = scratch_path("missing").join("dataset.json");
        assert!(write_dataset(&path, &CandleDataset::new()).is_err());
    }
}
