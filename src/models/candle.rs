use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One OHLCV bucket. On the wire it is `[time, low, high, open, close, volume]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub low: f64,
    pub high: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Bucket start in epoch seconds.
    pub fn timestamp(&self) -> i64 {
        self.time.timestamp()
    }
}

impl Serialize for Candle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            self.timestamp(),
            self.low,
            self.high,
            self.open,
            self.close,
            self.volume,
        )
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Candle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (timestamp, low, high, open, close, volume) =
            <(i64, f64, f64, f64, f64, f64)>::deserialize(deserializer)?;
        let time = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {timestamp}")))?;
        Ok(Candle {
            time,
            low,
            high,
            open,
            close,
            volume,
        })
    }
}

/// Every batch fetched during one run, in request order.
///
/// Append only. Serializes as a single array of candles with the batches
/// concatenated, the same nested shape the exchange answers with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleDataset {
    batches: Vec<Vec<Candle>>,
}

impl CandleDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&mut self, batch: Vec<Candle>) {
        self.batches.push(batch);
    }

    pub fn batches(&self) -> &[Vec<Candle>] {
        &self.batches
    }

    /// Number of candles across all batches.
    pub fn len(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn candles(&self) -> impl Iterator<Item = &Candle> {
        self.batches.iter().flatten()
    }

    /// Oldest and newest candle times, if any candle was fetched.
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.candles().fold(None, |span, candle| match span {
            None => Some((candle.time, candle.time)),
            Some((oldest, newest)) => Some((oldest.min(candle.time), newest.max(candle.time))),
        })
    }
}

impl Serialize for CandleDataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for candle in self.candles() {
            seq.serialize_element(candle)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn candle(timestamp: i64, close: f64) -> Candle {
        Candle {
            time: DateTime::from_timestamp(timestamp, 0).unwrap(),
            low: close - 1.0,
            high: close + 1.0,
            open: close,
            close,
            volume: 10.5,
        }
    }

    #[test]
    fn test_candle_serializes_as_array() {
        let json = serde_json::to_string(&candle(1509537600, 300.0)).unwrap();
        assert_eq!(json, "[1509537600,299.0,301.0,300.0,300.0,10.5]");
    }

    #[test]
    fn test_candle_deserializes_from_array() {
        let parsed: Candle = serde_json::from_str("[1509537600, 1.5, 2.5, 2, 1.75, 1000]").unwrap();
        assert_eq!(parsed.timestamp(), 1509537600);
        assert_relative_eq!(parsed.low, 1.5);
        assert_relative_eq!(parsed.open, 2.0);
        assert_relative_eq!(parsed.volume, 1000.0);
    }

    #[test]
    fn test_empty_dataset_is_empty_array() {
        let dataset = CandleDataset::new();
        assert!(dataset.is_empty());
        assert_eq!(dataset.time_span(), None);
        assert_eq!(serde_json::to_string(&dataset).unwrap(), "[]");
    }

    #[test]
    fn test_dataset_concatenates_batches_in_request_order() {
        let mut dataset = CandleDataset::new();
        dataset.push_batch(vec![candle(600, 3.0), candle(300, 2.0)]);
        dataset.push_batch(Vec::new());
        dataset.push_batch(vec![candle(0, 1.0)]);

        assert_eq!(dataset.batches().len(), 3);
        assert_eq!(dataset.len(), 3);

        let timestamps: Vec<i64> = dataset.candles().map(Candle::timestamp).collect();
        assert_eq!(timestamps, vec![600, 300, 0]);

        let (oldest, newest) = dataset.time_span().unwrap();
        assert_eq!(oldest.timestamp(), 0);
        assert_eq!(newest.timestamp(), 600);

        let value = serde_json::to_value(&dataset).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
        assert_eq!(value[2][0], 0);
    }
}
