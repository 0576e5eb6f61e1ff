//! Time-bounded cache over a [`QuoteSource`] that never fails its callers.
//!
//! A fresh quote (younger than the TTL) is served from memory. Otherwise the
//! source is asked for a new one; if that fails for any reason the last known
//! quote is served, however old, and before any successful fetch the
//! configured fallback quote is served instead. Failed fetches never refresh
//! the TTL window, so the next call goes back to the network.

use crate::core::config::PriceCacheConfig;
use crate::core::{FeedError, PriceQuote, QuoteSource};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, instrument, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_FALLBACK: PriceQuote = PriceQuote {
    primary_usd: 67000.0,
    secondary_usd: 1950.0,
};

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Outcome of the running fetch, shared by every caller that waits on it.
type InFlight = Shared<BoxFuture<'static, PriceQuote>>;

#[derive(Default)]
struct CacheState {
    last_quote: Option<PriceQuote>,
    /// Set only by successful network fetches
    last_fetch_at: Option<Instant>,
    in_flight: Option<InFlight>,
}

impl CacheState {
    fn fallback_quote(&self, fallback: PriceQuote) -> PriceQuote {
        self.last_quote.unwrap_or(fallback)
    }
}

fn lock_state(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct PriceCache<S: QuoteSource + 'static> {
    source: Arc<S>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    timeout: Duration,
    fallback: PriceQuote,
    // Never held across an await; fetches run in their own task.
    state: Arc<Mutex<CacheState>>,
}

impl<S: QuoteSource + 'static> PriceCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            clock: Arc::new(SystemClock),
            ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
            fallback: DEFAULT_FALLBACK,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    pub fn from_config(source: S, config: &PriceCacheConfig) -> Self {
        Self::new(source)
            .with_ttl(config.ttl())
            .with_timeout(config.timeout())
            .with_fallback(config.fallback)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fallback(mut self, fallback: PriceQuote) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the best available quote. Never fails.
    ///
    /// On a miss the fetch runs as a detached task, so dropping the caller
    /// does not cancel it and the cache is still updated when it completes.
    /// Callers arriving while a fetch is running wait on that same fetch
    /// and get its outcome, fresh quote or fallback alike.
    #[instrument(name = "PriceCacheGet", skip(self))]
    pub async fn get_quote(&self) -> PriceQuote {
        let in_flight = {
            let mut state = lock_state(&self.state);
            let now = self.clock.now();

            if let (Some(quote), Some(fetched_at)) = (state.last_quote, state.last_fetch_at)
                && now.saturating_duration_since(fetched_at) < self.ttl
            {
                debug!("Cache HIT for quote");
                return quote;
            }

            let running = state
                .in_flight
                .as_ref()
                .filter(|fetch| fetch.peek().is_none())
                .cloned();
            match running {
                Some(fetch) => {
                    debug!("Cache MISS for quote, joining running fetch");
                    fetch
                }
                None => {
                    debug!("Cache MISS for quote");
                    let fetch = self.spawn_fetch(now);
                    state.in_flight = Some(fetch.clone());
                    fetch
                }
            }
        };

        in_flight.await
    }

    fn spawn_fetch(&self, started_at: Instant) -> InFlight {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let timeout = self.timeout;
        let fallback = self.fallback;

        let task = tokio::spawn(
            {
                let state = Arc::clone(&state);
                async move {
                    let result = match tokio::time::timeout(timeout, source.fetch_quote()).await {
                        Ok(result) => result,
                        Err(_) => Err(FeedError::FetchFailed(format!(
                            "Timed out after {timeout:?}"
                        ))),
                    };

                    let mut state = lock_state(&state);
                    state.in_flight = None;
                    match result {
                        Ok(quote) => {
                            debug!(?quote, "Fetched fresh quote");
                            state.last_quote = Some(quote);
                            state.last_fetch_at = Some(started_at);
                            quote
                        }
                        Err(FeedError::RateLimited) => {
                            // TODO: back off on 429 instead of retrying on the next call
                            warn!("Rate limited by price feed, using cached or default prices");
                            state.fallback_quote(fallback)
                        }
                        Err(e) => {
                            warn!(error = %e, "Error fetching prices, using cached or default prices");
                            state.fallback_quote(fallback)
                        }
                    }
                }
            }
            .in_current_span(),
        );

        async move {
            task.await.unwrap_or_else(|e| {
                warn!(error = %e, "Price fetch task failed, using cached or default prices");
                let mut state = lock_state(&state);
                state.in_flight = None;
                state.fallback_quote(fallback)
            })
        }
        .boxed()
        .shared()
    }

    /// Time of the last successful fetch, if any.
    pub fn last_fetch_at(&self) -> Option<Instant> {
        lock_state(&self.state).last_fetch_at
    }
}

/// Converts a USD amount into units of an asset, with 8 fractional digits.
///
/// `asset_usd_price` must be positive; this is not checked.
pub fn convert(usd_amount: f64, asset_usd_price: f64) -> String {
    convert_with_precision(usd_amount, asset_usd_price, 8)
}

pub fn convert_with_precision(usd_amount: f64, asset_usd_price: f64, digits: usize) -> String {
    format!("{:.*}", digits, usd_amount / asset_usd_price)
}
