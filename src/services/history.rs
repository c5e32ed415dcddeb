use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, error, info, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::exchange::{CandleRequest, CandleSource};
use crate::helpers::to_iso8601;
use crate::models::{Candle, CandleDataset, FetchWindow, Granularity};

/// Candles the exchange returns at most per call.
pub const DEFAULT_BATCH_LIMIT: u32 = 350;
/// Flat delay between requests, kept under the exchange's rate limit.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub batch_limit: u32,
    pub request_delay: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_BATCH_LIMIT,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

/// What to download.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTarget {
    pub product: String,
    pub granularity: Granularity,
    /// Earliest instant of interest. Defaults to the moment the run starts.
    pub start: Option<DateTime<Utc>>,
    /// Latest instant of interest. Without it the first request carries no window.
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Elapsed,
    Interrupted,
}

/// Cuts a running [`Throttle::pause`] short.
///
/// Fed by whoever owns the process signals. Only a pause that is in progress
/// can be interrupted; nothing is remembered for later pauses.
#[derive(Debug, Default)]
pub struct Interrupt {
    waiting: AtomicBool,
    notify: Notify,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when no pause was running, in which case nothing happened.
    pub fn signal(&self) -> bool {
        if self.waiting.swap(false, Ordering::SeqCst) {
            self.notify.notify_waiters();
            true
        } else {
            false
        }
    }

    async fn sleep(&self, delay: Duration) -> Pause {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        self.waiting.store(true, Ordering::SeqCst);

        let pause = tokio::select! {
            _ = tokio::time::sleep(delay) => Pause::Elapsed,
            _ = notified.as_mut() => Pause::Interrupted,
        };

        self.waiting.store(false, Ordering::SeqCst);
        pause
    }
}

/// Fixed delay between two requests.
///
/// An interrupt ends the wait early. It never ends the run: the loop goes on
/// with its next request either way.
#[derive(Debug, Clone)]
pub struct Throttle {
    delay: Duration,
    interrupt: Option<Arc<Interrupt>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            interrupt: None,
        }
    }

    pub fn with_interrupt(mut self, interrupt: Arc<Interrupt>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub async fn pause(&self) -> Pause {
        if self.delay.is_zero() {
            return Pause::Elapsed;
        }

        match &self.interrupt {
            Some(interrupt) => interrupt.sleep(self.delay).await,
            None => {
                tokio::time::sleep(self.delay).await;
                Pause::Elapsed
            }
        }
    }
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub dataset: CandleDataset,
    /// Error that ended the run early, if any. The dataset still holds
    /// every batch fetched before it.
    pub failure: Option<Error>,
    pub requests: usize,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Window for the request after `batch`.
///
/// The new upper bound is the oldest candle actually returned (batches are
/// newest first). An empty batch re-anchors on the exhausted window's start,
/// or on `now` when no window was established yet, so the next start is
/// always strictly older.
pub fn next_window(
    current: Option<FetchWindow>,
    batch: &[Candle],
    now: DateTime<Utc>,
    lookback: TimeDelta,
) -> FetchWindow {
    let end = match batch.last() {
        Some(oldest) => oldest.time,
        None => current.map(|window| window.start()).unwrap_or(now),
    };
    FetchWindow::ending_at(end, lookback)
}

/// Walks backward from `end` (or the latest data) to `start` one bounded
/// request at a time.
pub struct CandleFetchLoop<S> {
    source: S,
    target: FetchTarget,
    settings: FetchSettings,
    throttle: Throttle,
}

impl<S: CandleSource> CandleFetchLoop<S> {
    pub fn new(source: S, target: FetchTarget, settings: FetchSettings) -> Result<Self> {
        if let (Some(start), Some(end)) = (target.start, target.end) {
            FetchWindow::new(start, end)?;
        }
        Ok(Self {
            source,
            target,
            settings,
            throttle: Throttle::new(settings.request_delay),
        })
    }

    /// Lets `interrupt` cut the delays between requests short.
    pub fn with_interrupt(mut self, interrupt: Arc<Interrupt>) -> Self {
        self.throttle = self.throttle.with_interrupt(interrupt);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target(&self) -> &FetchTarget {
        &self.target
    }

    pub fn lookback(&self) -> TimeDelta {
        self.target.granularity.lookback(self.settings.batch_limit)
    }

    /// The loop keeps going while this instant is before the current window start.
    pub fn stop_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.target.start.unwrap_or(now)
    }

    pub fn first_window(&self) -> Option<FetchWindow> {
        self.target
            .end
            .map(|end| FetchWindow::ending_at(end, self.lookback()))
    }

    /// Runs to completion. Never fails: a fetch error ends the run early and
    /// is handed back in [`FetchOutcome::failure`] next to the partial data.
    pub async fn run(&self, now: DateTime<Utc>) -> FetchOutcome {
        let lookback = self.lookback();
        let stop = self.stop_boundary(now);
        let mut window = self.first_window();
        let mut dataset = CandleDataset::new();
        let mut requests = 0;

        info!(
            "downloading {} {} candles back to {}",
            self.target.product,
            self.target.granularity,
            to_iso8601(stop)
        );

        loop {
            let request = CandleRequest {
                product: self.target.product.clone(),
                granularity: self.target.granularity,
                window,
            };
            requests += 1;

            let batch = match self.source.fetch_candles(&request).await {
                Ok(batch) => batch,
                Err(e) => {
                    error!(
                        "request {} failed, keeping the {} candles fetched so far: {}",
                        requests,
                        dataset.len(),
                        e
                    );
                    return FetchOutcome {
                        dataset,
                        failure: Some(e),
                        requests,
                    };
                }
            };

            let next = next_window(window, &batch, now, lookback);
            debug!(
                "batch of {} candles, next window {} .. {}",
                batch.len(),
                to_iso8601(next.start()),
                to_iso8601(next.end())
            );
            dataset.push_batch(batch);
            window = Some(next);

            if stop >= next.start() {
                break;
            }

            if self.throttle.pause().await == Pause::Interrupted {
                warn!("delay interrupted, sending the next request now");
            }
        }

        info!(
            "fetched {} candles in {} requests",
            dataset.len(),
            requests
        );
        FetchOutcome {
            dataset,
            failure: None,
            requests,
        }
    }
}
