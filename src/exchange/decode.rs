use chrono::DateTime;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::Candle;

const FIELDS: [&str; 6] = ["time", "low", "high", "open", "close", "volume"];

/// Decodes a candle endpoint body: an array of `[time, low, high, open, close, volume]`.
///
/// Every row must hold exactly six numbers and an integral timestamp,
/// otherwise the whole batch is rejected with [`Error::MalformedResponse`].
pub fn decode_batch(body: &str) -> Result<Vec<Candle>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("body is not JSON: {e}")))?;

    let rows = match value {
        Value::Array(rows) => rows,
        other => {
            return Err(Error::MalformedResponse(format!(
                "expected an array of candles, got {other}"
            )))
        }
    };

    rows.iter()
        .enumerate()
        .map(|(index, row)| decode_candle(index, row))
        .collect()
}

fn decode_candle(index: usize, row: &Value) -> Result<Candle> {
    let fields = row
        .as_array()
        .ok_or_else(|| malformed(index, format!("expected an array, got {row}")))?;

    if fields.len() != FIELDS.len() {
        return Err(malformed(
            index,
            format!("expected {} fields, got {}", FIELDS.len(), fields.len()),
        ));
    }

    let timestamp = fields[0]
        .as_i64()
        .or_else(|| {
            fields[0]
                .as_f64()
                .filter(|secs| secs.fract() == 0.0)
                .map(|secs| secs as i64)
        })
        .ok_or_else(|| malformed(index, format!("time is not an integer: {}", fields[0])))?;

    let time = DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| malformed(index, format!("time out of range: {timestamp}")))?;

    let number = |pos: usize| -> Result<f64> {
        fields[pos].as_f64().ok_or_else(|| {
            malformed(
                index,
                format!("{} is not a number: {}", FIELDS[pos], fields[pos]),
            )
        })
    };

    Ok(Candle {
        time,
        low: number(1)?,
        high: number(2)?,
        open: number(3)?,
        close: number(4)?,
        volume: number(5)?,
    })
}

fn malformed(index: usize, detail: String) -> Error {
    Error::MalformedResponse(format!("candle #{index}: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_decode_newest_first_batch() {
        let body = "[[1509537900, 280.1, 281.5, 280.5, 281.0, 12.25], [1509537600, 279, 280.9, 279.5, 280.5, 3]]";
        let batch = decode_batch(body).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].timestamp(), 1509537900);
        assert_eq!(batch[1].timestamp(), 1509537600);
        assert_relative_eq!(batch[0].low, 280.1);
        assert_relative_eq!(batch[0].high, 281.5);
        assert_relative_eq!(batch[0].open, 280.5);
        assert_relative_eq!(batch[0].close, 281.0);
        assert_relative_eq!(batch[0].volume, 12.25);
        assert_relative_eq!(batch[1].low, 279.0);
    }

    #[test]
    fn test_decode_empty_batch() {
        assert!(decode_batch("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_error_object() {
        let err = decode_batch(r#"{"message": "NotFound"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_arity() {
        let err = decode_batch("[[1509537600, 1, 2, 3, 4]]").unwrap_err();
        assert!(err.to_string().contains("expected 6 fields, got 5"));
    }

    #[test]
    fn test_decode_rejects_non_numeric_field() {
        let err = decode_batch(r#"[[1509537600, 1, 2, "3", 4, 5]]"#).unwrap_err();
        assert!(err.to_string().contains("open is not a number"));
    }

    #[test]
    fn test_decode_rejects_fractional_time() {
        let err = decode_batch("[[1509537600.5, 1, 2, 3, 4, 5]]").unwrap_err();
        assert!(err.to_string().contains("time is not an integer"));
    }

    #[test]
    fn test_decode_reports_offending_row() {
        let err = decode_batch("[[1509537600, 1, 2, 3, 4, 5], null]").unwrap_err();
        assert!(err.to_string().contains("candle #1"));
    }
}
