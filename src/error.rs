use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("exchange answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed candle response: {0}")]
    MalformedResponse(String),
    #[error("window start {start} is after end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl Error {
    /// Network, DNS or HTTP level failure while talking to the exchange.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Status { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_transport() {
        let err = Error::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "down".to_string(),
        };
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "exchange answered 503 Service Unavailable: down");
    }

    #[test]
    fn test_malformed_is_not_transport() {
        let err = Error::MalformedResponse("expected 6 fields".to_string());
        assert!(!err.is_transport());
    }
}
