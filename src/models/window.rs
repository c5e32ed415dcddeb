use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{Error, Result};

/// `[start, end)` range requested from the exchange in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl FetchWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window of length `lookback` whose upper bound is `end`.
    pub fn ending_at(end: DateTime<Utc>, lookback: TimeDelta) -> Self {
        Self {
            start: end - lookback,
            end,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}
