pub mod connector;
pub mod decode;
pub mod simulator;
pub use connector::ExchangeConnector;
pub use decode::decode_batch;
pub use simulator::ExchangeSimulator;

use async_trait::async_trait;

use crate::error::Result;
use crate::helpers::to_iso8601;
use crate::models::{Candle, FetchWindow, Granularity};

/// One call to the candle endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleRequest {
    pub product: String,
    pub granularity: Granularity,
    /// `None` lets the exchange pick its most recent window.
    pub window: Option<FetchWindow>,
}

impl CandleRequest {
    pub fn path(&self) -> String {
        format!("/products/{}/candles", self.product)
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("granularity", self.granularity.period().to_string())];
        if let Some(window) = self.window {
            params.push(("start", to_iso8601(window.start())));
            params.push(("end", to_iso8601(window.end())));
        }
        params
    }

    /// Human readable URL, used for logging.
    pub fn url(&self, base_url: &str) -> String {
        let query = self
            .query_params()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}{}?{}", base_url, self.path(), query)
    }
}

/// Candle endpoint client: one GET, one batch, newest candle first.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>>;
}
