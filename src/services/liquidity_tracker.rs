use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::LiquidityPosition;
use crate::providers::graph::{
    V2LiquidityRow, V3PositionRow, PANCAKESWAP_SUBGRAPH, SUSHISWAP_SUBGRAPH, UNISWAP_V2_SUBGRAPH,
};
use crate::providers::GraphClient;

/// Collects active liquidity-provision positions for one wallet across
/// Uniswap v2/v3, SushiSwap, and PancakeSwap.
#[derive(Clone)]
pub struct LiquidityTracker {
    graph: GraphClient,
}

impl LiquidityTracker {
    pub fn new(graph: GraphClient) -> Self {
        Self { graph }
    }

    pub async fn track(&self, address: &str) -> Vec<LiquidityPosition> {
        let (uni_v2, sushi, pancake, uni_v3) = tokio::join!(
            self.graph
                .v2_liquidity_positions(UNISWAP_V2_SUBGRAPH, address),
            self.graph
                .v2_liquidity_positions(SUSHISWAP_SUBGRAPH, address),
            self.graph
                .v2_liquidity_positions(PANCAKESWAP_SUBGRAPH, address),
            self.graph.v3_liquidity_positions(address),
        );

        let mut positions = Vec::new();

        for (protocol, result) in [
            ("uniswap_v2", uni_v2),
            ("sushiswap", sushi),
            ("pancakeswap", pancake),
        ] {
            match result {
                Ok(rows) => {
                    positions.extend(rows.iter().map(|r| from_v2(address, protocol, r)));
                }
                Err(e) => {
                    tracing::warn!(protocol = protocol, error = %e, "Liquidity fetch failed")
                }
            }
        }

        match uni_v3 {
            Ok(rows) => positions.extend(rows.iter().map(|r| from_v3(address, r))),
            Err(e) => tracing::warn!(protocol = "uniswap_v3", error = %e, "Liquidity fetch failed"),
        }

        positions.retain(|p| p.shares > Decimal::ZERO);
        positions
    }
}

// ---------------------------------------------------------------------------
// Row conversions
// ---------------------------------------------------------------------------

fn dec(field: &Option<String>) -> Decimal {
    field
        .as_deref()
        .and_then(|s| Decimal::from_str(s).ok())
        .unwrap_or(Decimal::ZERO)
}

fn ts_secs(field: &Option<String>) -> DateTime<Utc> {
    field
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn pair_symbols(pair: &Option<crate::providers::graph::PairRow>) -> (String, String) {
    let token0 = pair
        .as_ref()
        .and_then(|p| p.token0.as_ref())
        .and_then(|t| t.symbol.clone())
        .unwrap_or_default();
    let token1 = pair
        .as_ref()
        .and_then(|p| p.token1.as_ref())
        .and_then(|t| t.symbol.clone())
        .unwrap_or_default();
    (token0, token1)
}

fn from_v2(address: &str, protocol: &str, row: &V2LiquidityRow) -> LiquidityPosition {
    let (token0, token1) = pair_symbols(&row.pair);

    LiquidityPosition {
        address: address.to_string(),
        protocol: protocol.to_string(),
        pair: format!("{token0}/{token1}"),
        token0,
        token1,
        amount0: dec(&row.token0_deposited) - dec(&row.token0_withdrawn),
        amount1: dec(&row.token1_deposited) - dec(&row.token1_withdrawn),
        shares: dec(&row.liquidity_token_balance),
        apr: Decimal::ZERO,
        // v2 subgraphs fold fees into reserves; not separately reported.
        fees_earned: Decimal::ZERO,
        impermanent_loss: Decimal::ZERO,
        timestamp: ts_secs(&row.timestamp),
    }
}

fn from_v3(address: &str, row: &V3PositionRow) -> LiquidityPosition {
    let (token0, token1) = pair_symbols(&row.pool);

    LiquidityPosition {
        address: address.to_string(),
        protocol: "uniswap_v3".into(),
        pair: format!("{token0}/{token1}"),
        token0,
        token1,
        amount0: dec(&row.deposited_token0) - dec(&row.withdrawn_token0),
        amount1: dec(&row.deposited_token1) - dec(&row.withdrawn_token1),
        shares: dec(&row.liquidity),
        apr: Decimal::ZERO,
        fees_earned: dec(&row.collected_fees_token0) + dec(&row.collected_fees_token1),
        impermanent_loss: Decimal::ZERO,
        timestamp: ts_secs(&row.timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::graph::{PairRow, TokenRow};

    fn pair(sym0: &str, sym1: &str) -> Option<PairRow> {
        Some(PairRow {
            token0: Some(TokenRow {
                symbol: Some(sym0.into()),
            }),
            token1: Some(TokenRow {
                symbol: Some(sym1.into()),
            }),
        })
    }

    #[test]
    fn test_v2_amounts_are_net_of_withdrawals() {
        let row = V2LiquidityRow {
            pair: pair("WETH", "USDC"),
            liquidity_token_balance: Some("12.5".into()),
            token0_deposited: Some("10".into()),
            token1_deposited: Some("20000".into()),
            token0_withdrawn: Some("4".into()),
            token1_withdrawn: Some("8000".into()),
            timestamp: Some("1714560000".into()),
        };

        let pos = from_v2("0xwallet", "uniswap_v2", &row);
        assert_eq!(pos.pair, "WETH/USDC");
        assert_eq!(pos.amount0, Decimal::from(6));
        assert_eq!(pos.amount1, Decimal::from(12000));
        assert_eq!(pos.shares, Decimal::new(125, 1));
    }

    #[test]
    fn test_v3_fees_sum_both_tokens() {
        let row = V3PositionRow {
            pool: pair("WETH", "DAI"),
            liquidity: Some("999".into()),
            deposited_token0: Some("5".into()),
            deposited_token1: Some("10000".into()),
            withdrawn_token0: None,
            withdrawn_token1: None,
            collected_fees_token0: Some("0.3".into()),
            collected_fees_token1: Some("600".into()),
            timestamp: None,
        };

        let pos = from_v3("0xwallet", &row);
        assert_eq!(pos.protocol, "uniswap_v3");
        assert_eq!(pos.fees_earned, Decimal::new(6003, 1));
        assert_eq!(pos.timestamp, DateTime::UNIX_EPOCH);
    }
}
