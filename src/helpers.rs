use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Minute precision UTC form the candle endpoint expects, e.g. `2017-11-01T12:00Z`.
pub const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

pub fn to_iso8601(instant: DateTime<Utc>) -> String {
    instant.format(MINUTE_FORMAT).to_string()
}

/// Accepts RFC 3339, the minute precision form above, or a bare date (midnight UTC).
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, MINUTE_FORMAT) {
        return Ok(naive.and_utc());
    }
    if let Some(naive) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }
    Err(format!(
        "invalid instant '{s}'. Use RFC 3339 (2017-11-01T12:00:00Z), 2017-11-01T12:00Z or 2017-11-01."
    ))
}
