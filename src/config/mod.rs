use anyhow::{bail, Context, Result};
use std::env;

use crate::providers::{ChainEndpoint, ProviderKeys};

const DEFAULT_CHAINS: &str = "ethereum,bsc,polygon,arbitrum,optimism";

/// Runtime configuration, loaded once at startup from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub chains: Vec<ChainEndpoint>,
    pub coingecko_keys: ProviderKeys,
    pub cmc_keys: ProviderKeys,
    pub http_timeout_secs: u64,
    pub max_idle_per_host: usize,
    /// Re-analyze the same addresses on this cadence; absent means one pass.
    pub watch_interval_secs: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let chain_list = env::var("ANALYZE_CHAINS").unwrap_or_else(|_| DEFAULT_CHAINS.to_string());
        let chains = chain_list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(chain_endpoint)
            .collect::<Result<Vec<_>>>()?;
        if chains.is_empty() {
            bail!("ANALYZE_CHAINS resolved to no chains");
        }

        Ok(Self {
            database_url,
            chains,
            coingecko_keys: keys_from_env("COINGECKO"),
            cmc_keys: keys_from_env("CMC"),
            http_timeout_secs: env_u64("HTTP_TIMEOUT_SECS", 30)?,
            max_idle_per_host: env_u64("HTTP_MAX_IDLE_PER_HOST", 30)? as usize,
            watch_interval_secs: match env::var("WATCH_INTERVAL_SECS") {
                Ok(raw) => Some(
                    raw.parse()
                        .context("WATCH_INTERVAL_SECS must be an integer")?,
                ),
                Err(_) => None,
            },
        })
    }
}

/// Known block-explorer endpoints per chain. Credentials come from
/// `<PREFIX>_API_KEY` and `<PREFIX>_API_KEY_SECONDARY`.
fn chain_endpoint(name: &str) -> Result<ChainEndpoint> {
    let (base_url, native_symbol, prefix) = match name {
        "ethereum" => ("https://api.etherscan.io/api", "ETH", "ETHERSCAN"),
        "bsc" => ("https://api.bscscan.com/api", "BNB", "BSCSCAN"),
        "polygon" => ("https://api.polygonscan.com/api", "MATIC", "POLYGONSCAN"),
        "arbitrum" => ("https://api.arbiscan.io/api", "ETH", "ARBISCAN"),
        "optimism" => (
            "https://api-optimistic.etherscan.io/api",
            "ETH",
            "OPTIMISTIC_ETHERSCAN",
        ),
        "avalanche" => ("https://api.snowtrace.io/api", "AVAX", "SNOWTRACE"),
        other => bail!("unsupported chain: {other}"),
    };

    Ok(ChainEndpoint {
        name: name.to_string(),
        base_url: base_url.to_string(),
        native_symbol: native_symbol.to_string(),
        keys: keys_from_env(prefix),
    })
}

fn keys_from_env(prefix: &str) -> ProviderKeys {
    ProviderKeys {
        primary: env::var(format!("{prefix}_API_KEY")).ok(),
        secondary: env::var(format!("{prefix}_API_KEY_SECONDARY")).ok(),
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be an integer")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_chain_endpoints() {
        let eth = chain_endpoint("ethereum").unwrap();
        assert_eq!(eth.base_url, "https://api.etherscan.io/api");
        assert_eq!(eth.native_symbol, "ETH");

        let bsc = chain_endpoint("bsc").unwrap();
        assert_eq!(bsc.native_symbol, "BNB");
    }

    #[test]
    fn test_unsupported_chain_is_rejected() {
        assert!(chain_endpoint("solana").is_err());
    }

    #[test]
    fn test_default_chain_list_parses() {
        let chains: Vec<_> = DEFAULT_CHAINS
            .split(',')
            .map(chain_endpoint)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(chains.len(), 5);
    }
}
