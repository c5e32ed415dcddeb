use chrono::TimeDelta;
use clap::ValueEnum;
use std::fmt;

/// Candle periods the exchange accepts. No other period is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Granularity {
    #[value(name = "one-minute", alias = "60")]
    OneMinute,
    #[value(name = "five-minutes", alias = "300")]
    FiveMinutes,
    #[value(name = "fifteen-minutes", alias = "900")]
    FifteenMinutes,
    #[value(name = "one-hour", alias = "3600")]
    OneHour,
    #[value(name = "six-hours", alias = "21600")]
    SixHours,
    #[value(name = "one-day", alias = "86400")]
    OneDay,
}

impl Granularity {
    /// Candle period in seconds.
    pub fn period(self) -> u32 {
        match self {
            Granularity::OneMinute => 60,
            Granularity::FiveMinutes => 300,
            Granularity::FifteenMinutes => 900,
            Granularity::OneHour => 3600,
            Granularity::SixHours => 21600,
            Granularity::OneDay => 86400,
        }
    }

    /// How far back a single request can see when the exchange returns at
    /// most `batch_limit` candles.
    pub fn lookback(self, batch_limit: u32) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.period()) * i64::from(batch_limit))
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.period())
    }
}
