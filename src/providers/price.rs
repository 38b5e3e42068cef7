use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

use super::explorer::ProviderKeys;

const COINGECKO_BASE: &str = "https://api.coingecko.com/api/v3";
const CMC_BASE: &str = "https://pro-api.coinmarketcap.com/v2";

/// Stablecoins are valued at 1 USD without a provider round-trip.
const STABLECOINS: [&str; 3] = ["USDT", "USDC", "DAI"];

/// Symbol → CoinGecko coin id; unmapped symbols fall back to lowercase.
const COIN_IDS: [(&str, &str); 10] = [
    ("ETH", "ethereum"),
    ("BTC", "bitcoin"),
    ("USDT", "tether"),
    ("USDC", "usd-coin"),
    ("BNB", "binancecoin"),
    ("MATIC", "matic-network"),
    ("AVAX", "avalanche-2"),
    ("UNI", "uniswap"),
    ("LINK", "chainlink"),
    ("AAVE", "aave"),
];

fn coin_id(symbol: &str) -> String {
    COIN_IDS
        .iter()
        .find(|(sym, _)| *sym == symbol)
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| symbol.to_lowercase())
}

#[derive(Debug, Error)]
enum PriceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no usable price in response")]
    Unavailable,
}

/// Resolves a token's USD price at a timestamp.
///
/// Resolution order: cache → primary historical provider (CoinGecko) →
/// secondary historical provider (CoinMarketCap) → current spot → zero.
/// Zero means "valuation unknown" and is never an error. Every resolution
/// outcome is cached by (token, calendar date) for the process lifetime;
/// writes are idempotent, so concurrent lookups need no coordination beyond
/// the mutex.
pub struct PriceResolver {
    http: Client,
    coingecko_keys: ProviderKeys,
    cmc_keys: ProviderKeys,
    coingecko_base: String,
    cmc_base: String,
    cache: Mutex<HashMap<(String, NaiveDate), Decimal>>,
}

impl PriceResolver {
    pub fn new(http: Client, coingecko_keys: ProviderKeys, cmc_keys: ProviderKeys) -> Self {
        Self::with_bases(http, coingecko_keys, cmc_keys, COINGECKO_BASE, CMC_BASE)
    }

    fn with_bases(
        http: Client,
        coingecko_keys: ProviderKeys,
        cmc_keys: ProviderKeys,
        coingecko_base: &str,
        cmc_base: &str,
    ) -> Self {
        Self {
            http,
            coingecko_keys,
            cmc_keys,
            coingecko_base: coingecko_base.into(),
            cmc_base: cmc_base.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// USD price of `token` on the calendar date of `at`.
    pub async fn price_at(&self, token: &str, at: DateTime<Utc>) -> Decimal {
        let symbol = token.to_uppercase();
        if STABLECOINS.contains(&symbol.as_str()) {
            return Decimal::ONE;
        }

        let date = at.date_naive();
        if let Some(price) = self.cache.lock().await.get(&(symbol.clone(), date)) {
            return *price;
        }

        // The lock is not held across the fetch: concurrent misses for the
        // same key may each hit the providers, and both insert the same
        // value. Tolerated; no in-flight deduplication.
        let price = self.resolve(&symbol, at).await;
        self.cache.lock().await.insert((symbol, date), price);
        price
    }

    async fn resolve(&self, symbol: &str, at: DateTime<Utc>) -> Decimal {
        match self.coingecko_history(symbol, at).await {
            Ok(price) if price > Decimal::ZERO => return price,
            Ok(_) => {}
            Err(e) => tracing::debug!(token = symbol, error = %e, "CoinGecko history failed"),
        }

        match self.cmc_history(symbol, at).await {
            Ok(price) if price > Decimal::ZERO => return price,
            Ok(_) => {}
            Err(e) => tracing::debug!(token = symbol, error = %e, "CoinMarketCap history failed"),
        }

        match self.spot(symbol).await {
            Ok(price) if price > Decimal::ZERO => return price,
            Ok(_) => {}
            Err(e) => tracing::debug!(token = symbol, error = %e, "Spot price failed"),
        }

        tracing::warn!(token = symbol, "Price resolution exhausted, valuing as zero");
        Decimal::ZERO
    }

    async fn coingecko_history(
        &self,
        symbol: &str,
        at: DateTime<Utc>,
    ) -> Result<Decimal, PriceError> {
        let url = format!("{}/coins/{}/history", self.coingecko_base, coin_id(symbol));
        let date = at.format("%d-%m-%Y").to_string();
        let mut last_err = PriceError::Unavailable;

        for key in self.coingecko_keys.attempts() {
            let mut req = self.http.get(&url).query(&[("date", date.as_str())]);
            if !key.is_empty() {
                req = req.header("x-cg-demo-api-key", key);
            }

            match Self::extract_price(req, "/market_data/current_price/usd").await {
                Ok(price) => return Ok(price),
                Err(e) => last_err = e,
            }
        }

        Err(last_err)
    }

    async fn cmc_history(&self, symbol: &str, at: DateTime<Utc>) -> Result<Decimal, PriceError> {
        let url = format!("{}/cryptocurrency/quotes/historical", self.cmc_base);
        let time_end = at.to_rfc3339();
        let mut last_err = PriceError::Unavailable;

        for key in self.cmc_keys.attempts() {
            let req = self
                .http
                .get(&url)
                .query(&[
                    ("symbol", symbol),
                    ("time_end", time_end.as_str()),
                    ("count", "1"),
                ])
                .header("X-CMC_PRO_API_KEY", key);

            match Self::extract_price(req, "/data/quotes/0/quote/USD/price").await {
                Ok(price) => return Ok(price),
                Err(e) => last_err = e,
            }
        }

        Err(last_err)
    }

    async fn spot(&self, symbol: &str) -> Result<Decimal, PriceError> {
        let id = coin_id(symbol);
        let url = format!("{}/simple/price", self.coingecko_base);
        let req = self
            .http
            .get(&url)
            .query(&[("ids", id.as_str()), ("vs_currencies", "usd")]);

        Self::extract_price(req, &format!("/{id}/usd")).await
    }

    async fn extract_price(
        req: reqwest::RequestBuilder,
        pointer: &str,
    ) -> Result<Decimal, PriceError> {
        let body: Value = req.send().await?.error_for_status()?.json().await?;

        body.pointer(pointer)
            .and_then(Value::as_f64)
            .and_then(|p| Decimal::try_from(p).ok())
            .ok_or(PriceError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolver whose providers are unreachable, so only the cache and the
    /// zero fallback can answer.
    fn offline_resolver() -> PriceResolver {
        PriceResolver::with_bases(
            Client::new(),
            ProviderKeys::default(),
            ProviderKeys::default(),
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
        )
    }

    #[tokio::test]
    async fn test_exhausted_resolution_yields_zero_and_is_cached() {
        let resolver = offline_resolver();
        let at = Utc::now();

        assert_eq!(resolver.price_at("FOO", at).await, Decimal::ZERO);

        let key = ("FOO".to_string(), at.date_naive());
        assert!(resolver.cache.lock().await.contains_key(&key));
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache_without_network() {
        let resolver = offline_resolver();
        let at = Utc::now();
        let key = ("FOO".to_string(), at.date_naive());

        // Plant a cache entry the offline providers could never produce; if
        // the second lookup returns it, no network request was issued.
        resolver
            .cache
            .lock()
            .await
            .insert(key, Decimal::from(42));

        assert_eq!(resolver.price_at("FOO", at).await, Decimal::from(42));
    }

    #[tokio::test]
    async fn test_stablecoins_are_one_usd() {
        let resolver = offline_resolver();
        assert_eq!(resolver.price_at("USDC", Utc::now()).await, Decimal::ONE);
        assert_eq!(resolver.price_at("usdt", Utc::now()).await, Decimal::ONE);
    }

    #[test]
    fn test_coin_id_mapping() {
        assert_eq!(coin_id("ETH"), "ethereum");
        assert_eq!(coin_id("PEPE"), "pepe");
    }
}
