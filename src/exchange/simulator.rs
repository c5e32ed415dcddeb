use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tokio::sync::Mutex;

use super::{CandleRequest, CandleSource};
use crate::error::Result;
use crate::models::{Candle, Granularity};

/// In-memory candle source that replays scripted answers in order and
/// records every request it receives. Once the script runs out it answers
/// with empty batches, like an exchange with no older history.
#[derive(Debug, Default)]
pub struct ExchangeSimulator {
    responses: Mutex<VecDeque<Result<Vec<Candle>>>>,
    requests: Mutex<Vec<CandleRequest>>,
}

impl ExchangeSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch(self, batch: Vec<Candle>) -> Self {
        self.with_response(Ok(batch))
    }

    pub fn with_response(mut self, response: Result<Vec<Candle>>) -> Self {
        self.responses.get_mut().push_back(response);
        self
    }

    pub async fn requests(&self) -> Vec<CandleRequest> {
        self.requests.lock().await.clone()
    }

    /// Newest-first batch of `count` flat candles whose oldest bucket opens at `oldest`.
    pub fn batch_from(oldest: DateTime<Utc>, granularity: Granularity, count: usize) -> Vec<Candle> {
        let step = granularity.lookback(1);
        (0..count as i32)
            .rev()
            .map(|i| Candle {
                time: oldest + step * i,
                low: 100.0,
                high: 100.0,
                open: 100.0,
                close: 100.0,
                volume: 1.0,
            })
            .collect()
    }
}

#[async_trait]
impl CandleSource for ExchangeSimulator {
    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        self.requests.lock().await.push(request.clone());
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
