use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

const DYDX_INDEXER_BASE: &str = "https://indexer.dydx.trade/v4";
const MUX_API_BASE: &str = "https://api.mux.network/v1";

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// dYdX
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DydxPositionRow {
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub entry_price: Option<String>,
    #[serde(default)]
    pub oracle_price: Option<String>,
    #[serde(default)]
    pub unrealized_pnl: Option<String>,
    #[serde(default)]
    pub realized_pnl: Option<String>,
    #[serde(default)]
    pub margin: Option<String>,
    #[serde(default)]
    pub leverage: Option<String>,
    #[serde(default)]
    pub liquidation_price: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DydxPositionsResponse {
    #[serde(default)]
    positions: Vec<DydxPositionRow>,
}

/// REST client for the dYdX v4 indexer.
#[derive(Debug, Clone)]
pub struct DydxClient {
    http: Client,
    base_url: String,
}

impl DydxClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: DYDX_INDEXER_BASE.into(),
        }
    }

    pub async fn positions(&self, address: &str) -> Result<Vec<DydxPositionRow>, IndexerError> {
        let url = format!("{}/addresses/{}/positions", self.base_url, address);
        let resp = self.http.get(&url).send().await?.error_for_status()?;

        let body: DydxPositionsResponse = resp.json().await?;
        Ok(body.positions)
    }
}

// ---------------------------------------------------------------------------
// MUX
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuxPositionRow {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub entry_price: Option<String>,
    #[serde(default)]
    pub mark_price: Option<String>,
    #[serde(default)]
    pub unrealized_pnl: Option<String>,
    #[serde(default)]
    pub realized_pnl: Option<String>,
    #[serde(default)]
    pub margin: Option<String>,
    #[serde(default)]
    pub leverage: Option<String>,
    #[serde(default)]
    pub liquidation_price: Option<String>,
    #[serde(default)]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MuxPositionsResponse {
    #[serde(default)]
    positions: Vec<MuxPositionRow>,
}

/// REST client for the MUX position indexer.
#[derive(Debug, Clone)]
pub struct MuxClient {
    http: Client,
    base_url: String,
}

impl MuxClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: MUX_API_BASE.into(),
        }
    }

    pub async fn positions(&self, address: &str) -> Result<Vec<MuxPositionRow>, IndexerError> {
        let url = format!("{}/positions/{}", self.base_url, address);
        let resp = self.http.get(&url).send().await?.error_for_status()?;

        let body: MuxPositionsResponse = resp.json().await?;
        Ok(body.positions)
    }
}
