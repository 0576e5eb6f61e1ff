//! Quote types and the remote feed abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// USD prices for the two tracked reference assets at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub primary_usd: f64,
    pub secondary_usd: f64,
}

impl PriceQuote {
    pub fn new(primary_usd: f64, secondary_usd: f64) -> Self {
        Self {
            primary_usd,
            secondary_usd,
        }
    }

    /// Both prices must be positive finite numbers.
    pub fn is_valid(&self) -> bool {
        [self.primary_usd, self.secondary_usd]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Rate limited by price feed")]
    RateLimited,

    #[error("Price fetch failed: {0}")]
    FetchFailed(String),
}

pub type FeedResult<T> = Result<T, FeedError>;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self) -> FeedResult<PriceQuote>;
}

#[async_trait]
impl<T: QuoteSource + ?Sized> QuoteSource for Arc<T> {
    async fn fetch_quote(&self) -> FeedResult<PriceQuote> {
        (**self).fetch_quote().await
    }
}
