use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use super::{decode_batch, CandleRequest, CandleSource};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::models::Candle;

/// reqwest backed client for the public `/products/{product}/candles` endpoint.
#[derive(Debug, Clone)]
pub struct ExchangeConnector {
    client: Client,
    base_url: String,
}

impl ExchangeConnector {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Points the connector at another host, e.g. a mock server.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CandleSource for ExchangeConnector {
    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        info!("{}", request.url(&self.base_url));

        let response = self
            .client
            .get(format!("{}{}", self.base_url, request.path()))
            .query(&request.query_params())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Status { status, body });
        }
        debug!("received {} bytes", body.len());

        let batch = decode_batch(&body)?;
        info!("Got {} candles.", batch.len());
        Ok(batch)
    }
}
