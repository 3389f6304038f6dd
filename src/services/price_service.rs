use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const SATS_PER_BTC: f64 = 100_000_000.0;
const CACHE_DURATION: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("Failed to fetch BTC price: {0}")]
    Network(String),
    #[error("Failed to parse BTC price: {0}")]
    Parse(String),
}

#[derive(Deserialize)]
struct MempoolPrice {
    #[serde(rename = "USD")]
    usd: f64,
}

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: f64,
    fetched_at: Instant,
}

/// Converts sat amounts to USD using a cached BTC price
pub struct PriceConverter {
    http_client: reqwest::Client,
    price_url: String,
    cache: RwLock<Option<CachedPrice>>,
}

impl PriceConverter {
    const DEFAULT_PRICE_URL: &'static str = "https://mempool.space/api/v1/prices";

    pub fn new() -> Self {
        Self::with_price_url(Self::DEFAULT_PRICE_URL.to_string())
    }

    /// Create a converter against a custom price endpoint (for testing)
    pub fn with_price_url(price_url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            price_url,
            cache: RwLock::new(None),
        }
    }

    /// Convert with a known BTC price, rounded to cents
    pub fn sats_to_usd_with_price(sats: u64, btc_price: f64) -> f64 {
        let usd = sats as f64 / SATS_PER_BTC * btc_price;
        (usd * 100.0).round() / 100.0
    }

    /// BTC price in USD. Served from cache for five minutes; an expired cache
    /// is still used when the endpoint cannot be reached.
    pub async fn btc_price(&self) -> Result<f64, PriceError> {
        if let Some(cached) = *self.cache.read().await {
            if cached.fetched_at.elapsed() < CACHE_DURATION {
                return Ok(cached.price);
            }
        }

        match self.fetch_price().await {
            Ok(price) => {
                *self.cache.write().await = Some(CachedPrice { price, fetched_at: Instant::now() });
                debug!("BTC price updated: {:.2} USD", price);
                Ok(price)
            }
            Err(e) => match *self.cache.read().await {
                Some(cached) => {
                    warn!("{}; using cached price {:.2}", e, cached.price);
                    Ok(cached.price)
                }
                None => Err(e),
            },
        }
    }

    async fn fetch_price(&self) -> Result<f64, PriceError> {
        let response = self
            .http_client
            .get(&self.price_url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| PriceError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PriceError::Network(format!("HTTP {}", response.status())));
        }

        let body: MempoolPrice = response
            .json()
            .await
            .map_err(|e| PriceError::Parse(e.to_string()))?;
        if !body.usd.is_finite() || body.usd <= 0.0 {
            return Err(PriceError::Parse(format!("unusable price {}", body.usd)));
        }
        Ok(body.usd)
    }

    #[cfg(test)]
    async fn seed(&self, price: f64, age: Duration) {
        let fetched_at = Instant::now().checked_sub(age).unwrap_or_else(Instant::now);
        *self.cache.write().await = Some(CachedPrice { price, fetched_at });
    }
}

impl Default for PriceConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a USD amount as `$1,234.56`
pub fn format_usd(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
