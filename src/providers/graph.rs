use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

pub const UNISWAP_V2_SUBGRAPH: &str = "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v2";
pub const UNISWAP_V3_SUBGRAPH: &str = "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v3";
pub const SUSHISWAP_SUBGRAPH: &str = "https://api.thegraph.com/subgraphs/name/sushiswap/exchange";
pub const PANCAKESWAP_SUBGRAPH: &str =
    "https://api.thegraph.com/subgraphs/name/pancakeswap/exchange-v2";
pub const GMX_SUBGRAPH: &str = "https://api.thegraph.com/subgraphs/name/gmx-io/gmx-stats";
pub const PERP_PROTOCOL_SUBGRAPH: &str =
    "https://api.thegraph.com/subgraphs/name/perpetual-protocol/perp-v2";

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GraphQL errors: {0}")]
    Query(String),

    #[error("missing data in response")]
    MissingData,
}

#[derive(Debug, Deserialize)]
struct GraphResponse<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    errors: Option<Value>,
}

// ---------------------------------------------------------------------------
// Row types — numbers arrive as strings, parsed by the trackers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmxPositionRow {
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub collateral: Option<String>,
    #[serde(default)]
    pub entry_price: Option<String>,
    #[serde(default)]
    pub mark_price: Option<String>,
    #[serde(default)]
    pub pnl: Option<String>,
    #[serde(default)]
    pub leverage: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerpProtocolPositionRow {
    #[serde(default)]
    pub base_token: Option<String>,
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
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenRow {
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairRow {
    #[serde(default)]
    pub token0: Option<TokenRow>,
    #[serde(default)]
    pub token1: Option<TokenRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2LiquidityRow {
    #[serde(default)]
    pub pair: Option<PairRow>,
    #[serde(default)]
    pub liquidity_token_balance: Option<String>,
    #[serde(default)]
    pub token0_deposited: Option<String>,
    #[serde(default)]
    pub token1_deposited: Option<String>,
    #[serde(default)]
    pub token0_withdrawn: Option<String>,
    #[serde(default)]
    pub token1_withdrawn: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V3PositionRow {
    #[serde(default)]
    pub pool: Option<PairRow>,
    #[serde(default)]
    pub liquidity: Option<String>,
    #[serde(default)]
    pub deposited_token0: Option<String>,
    #[serde(default)]
    pub deposited_token1: Option<String>,
    #[serde(default)]
    pub withdrawn_token0: Option<String>,
    #[serde(default)]
    pub withdrawn_token1: Option<String>,
    #[serde(default)]
    pub collected_fees_token0: Option<String>,
    #[serde(default)]
    pub collected_fees_token1: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PositionsData<T> {
    #[serde(default)]
    positions: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct LiquidityPositionsData {
    #[serde(default, rename = "liquidityPositions")]
    liquidity_positions: Vec<V2LiquidityRow>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

const GMX_POSITIONS_QUERY: &str = r#"
query getUserPositions($user: String!) {
    positions(where: {user: $user, isOpen: true}) {
        market side size collateral entryPrice markPrice pnl leverage timestamp
    }
}
"#;

const PERP_PROTOCOL_POSITIONS_QUERY: &str = r#"
query getPositions($trader: String!) {
    positions(where: {trader: $trader, isOpen: true}) {
        baseToken side size entryPrice markPrice unrealizedPnl realizedPnl
        margin leverage liquidationPrice timestamp
    }
}
"#;

const V2_LIQUIDITY_QUERY: &str = r#"
query getLiquidityPositions($user: String!) {
    liquidityPositions(where: {user: $user, liquidityTokenBalance_gt: "0"}) {
        pair { token0 { symbol } token1 { symbol } }
        liquidityTokenBalance
        token0Deposited token1Deposited token0Withdrawn token1Withdrawn
        timestamp
    }
}
"#;

const V3_POSITIONS_QUERY: &str = r#"
query getPositions($owner: String!) {
    positions(where: {owner: $owner, liquidity_gt: "0"}) {
        pool { token0 { symbol } token1 { symbol } }
        liquidity
        depositedToken0 depositedToken1 withdrawnToken0 withdrawnToken1
        collectedFeesToken0 collectedFeesToken1
        timestamp
    }
}
"#;

/// GraphQL-over-HTTP client for protocol subgraphs.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
}

impl GraphClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    async fn query<T: DeserializeOwned + Default>(
        &self,
        url: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, GraphError> {
        let resp = self
            .http
            .post(url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?;

        let body: GraphResponse<T> = resp.json().await?;

        if let Some(errors) = body.errors {
            return Err(GraphError::Query(errors.to_string()));
        }

        body.data.ok_or(GraphError::MissingData)
    }

    pub async fn gmx_positions(&self, address: &str) -> Result<Vec<GmxPositionRow>, GraphError> {
        let data: PositionsData<GmxPositionRow> = self
            .query(
                GMX_SUBGRAPH,
                GMX_POSITIONS_QUERY,
                json!({ "user": address.to_lowercase() }),
            )
            .await?;
        Ok(data.positions)
    }

    pub async fn perp_protocol_positions(
        &self,
        address: &str,
    ) -> Result<Vec<PerpProtocolPositionRow>, GraphError> {
        let data: PositionsData<PerpProtocolPositionRow> = self
            .query(
                PERP_PROTOCOL_SUBGRAPH,
                PERP_PROTOCOL_POSITIONS_QUERY,
                json!({ "trader": address.to_lowercase() }),
            )
            .await?;
        Ok(data.positions)
    }

    /// Fetch v2-schema liquidity positions; SushiSwap and PancakeSwap share
    /// the Uniswap v2 subgraph schema.
    pub async fn v2_liquidity_positions(
        &self,
        subgraph_url: &str,
        address: &str,
    ) -> Result<Vec<V2LiquidityRow>, GraphError> {
        let data: LiquidityPositionsData = self
            .query(
                subgraph_url,
                V2_LIQUIDITY_QUERY,
                json!({ "user": address.to_lowercase() }),
            )
            .await?;
        Ok(data.liquidity_positions)
    }

    pub async fn v3_liquidity_positions(
        &self,
        address: &str,
    ) -> Result<Vec<V3PositionRow>, GraphError> {
        let data: PositionsData<V3PositionRow> = self
            .query(
                UNISWAP_V3_SUBGRAPH,
                V3_POSITIONS_QUERY,
                json!({ "owner": address.to_lowercase() }),
            )
            .await?;
        Ok(data.positions)
    }
}
