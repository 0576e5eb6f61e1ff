use crate::core::config::{AssetConfig, CoinGeckoProviderConfig};
use crate::core::{FeedError, FeedResult, PriceQuote, QuoteSource};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Simple USD price lookups against the CoinGecko API.
pub struct CoinGeckoSource {
    base_url: String,
    primary_id: String,
    secondary_id: String,
    client: reqwest::Client,
}

impl CoinGeckoSource {
    pub fn new(
        base_url: &str,
        primary: &AssetConfig,
        secondary: &AssetConfig,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("chainbazaar/0.1")
            .timeout(timeout)
            .build()?;
        Ok(CoinGeckoSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            primary_id: primary.id.clone(),
            secondary_id: secondary.id.clone(),
            client,
        })
    }

    pub fn from_config(config: &CoinGeckoProviderConfig, timeout: Duration) -> Result<Self> {
        Self::new(&config.base_url, &config.primary, &config.secondary, timeout)
    }

    fn usd_price(&self, data: &SimplePriceResponse, id: &str) -> FeedResult<f64> {
        data.get(id)
            .map(|p| p.usd)
            .ok_or_else(|| FeedError::FetchFailed(format!("No USD price for asset: {id}")))
    }
}

// { "bitcoin": { "usd": 67000 }, "ethereum": { "usd": 1950 } }
type SimplePriceResponse = HashMap<String, UsdPrice>;

#[derive(Deserialize, Debug)]
struct UsdPrice {
    usd: f64,
}

#[async_trait]
impl QuoteSource for CoinGeckoSource {
    #[instrument(name = "CoinGeckoQuoteFetch", skip(self))]
    async fn fetch_quote(&self) -> FeedResult<PriceQuote> {
        let url = format!(
            "{}/simple/price?ids={},{}&vs_currencies=usd",
            self.base_url, self.primary_id, self.secondary_id
        );
        debug!("Requesting prices from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::FetchFailed(format!("Request timed out: {url}"))
            } else {
                FeedError::FetchFailed(format!("Request error: {e} URL: {url}"))
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited);
        }
        if !status.is_success() {
            return Err(FeedError::FetchFailed(format!("HTTP error: {status}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FeedError::FetchFailed(format!("Failed to read response: {e}")))?;

        let data: SimplePriceResponse = serde_json::from_str(&text)
            .map_err(|e| FeedError::FetchFailed(format!("Failed to parse JSON response: {e}")))?;

        let quote = PriceQuote::new(
            self.usd_price(&data, &self.primary_id)?,
            self.usd_price(&data, &self.secondary_id)?,
        );
        if !quote.is_valid() {
            return Err(FeedError::FetchFailed(format!(
                "Invalid prices in response: {quote:?}"
            )));
        }
        Ok(quote)
    }
}
