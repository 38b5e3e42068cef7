use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::PerpPosition;
use crate::providers::graph::{GmxPositionRow, PerpProtocolPositionRow};
use crate::providers::indexer::{DydxPositionRow, MuxPositionRow};
use crate::providers::{DydxClient, GraphClient, MuxClient};

/// Collects open perpetual positions for one wallet across GMX, dYdX,
/// Perpetual Protocol, and MUX.
///
/// Each exchange is fetched concurrently; one exchange being down costs only
/// that exchange's positions.
#[derive(Clone)]
pub struct PerpTracker {
    graph: GraphClient,
    dydx: DydxClient,
    mux: MuxClient,
}

impl PerpTracker {
    pub fn new(graph: GraphClient, dydx: DydxClient, mux: MuxClient) -> Self {
        Self { graph, dydx, mux }
    }

    pub async fn track(&self, address: &str) -> Vec<PerpPosition> {
        let (gmx, dydx, perp, mux) = tokio::join!(
            self.graph.gmx_positions(address),
            self.dydx.positions(address),
            self.graph.perp_protocol_positions(address),
            self.mux.positions(address),
        );

        let mut positions = Vec::new();

        match gmx {
            Ok(rows) => positions.extend(rows.iter().map(|r| from_gmx(address, r))),
            Err(e) => tracing::warn!(exchange = "gmx", error = %e, "Position fetch failed"),
        }
        match dydx {
            Ok(rows) => positions.extend(rows.iter().map(|r| from_dydx(address, r))),
            Err(e) => tracing::warn!(exchange = "dydx", error = %e, "Position fetch failed"),
        }
        match perp {
            Ok(rows) => positions.extend(rows.iter().map(|r| from_perp_protocol(address, r))),
            Err(e) => {
                tracing::warn!(exchange = "perp_protocol", error = %e, "Position fetch failed")
            }
        }
        match mux {
            Ok(rows) => positions.extend(rows.iter().map(|r| from_mux(address, r))),
            Err(e) => tracing::warn!(exchange = "mux", error = %e, "Position fetch failed"),
        }

        positions.retain(|p| p.is_open);
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

fn text(field: &Option<String>) -> String {
    field.clone().unwrap_or_default()
}

/// Unix-seconds string, as subgraphs emit timestamps.
fn ts_secs(field: &Option<String>) -> DateTime<Utc> {
    field
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn ts_rfc3339(field: &Option<String>) -> DateTime<Utc> {
    field
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn from_gmx(address: &str, row: &GmxPositionRow) -> PerpPosition {
    let entry_price = dec(&row.entry_price);
    PerpPosition {
        address: address.to_string(),
        exchange: "gmx".into(),
        symbol: text(&row.market),
        side: text(&row.side),
        size: dec(&row.size),
        entry_price,
        current_price: dec(&row.mark_price),
        unrealized_pnl: dec(&row.pnl),
        realized_pnl: Decimal::ZERO,
        margin: dec(&row.collateral),
        leverage: dec(&row.leverage),
        liquidation_price: Decimal::ZERO,
        timestamp: ts_secs(&row.timestamp),
        // The subgraph query already filters on isOpen.
        is_open: true,
    }
}

fn from_dydx(address: &str, row: &DydxPositionRow) -> PerpPosition {
    PerpPosition {
        address: address.to_string(),
        exchange: "dydx".into(),
        symbol: text(&row.market),
        side: text(&row.side),
        size: dec(&row.size),
        entry_price: dec(&row.entry_price),
        current_price: dec(&row.oracle_price),
        unrealized_pnl: dec(&row.unrealized_pnl),
        realized_pnl: dec(&row.realized_pnl),
        margin: dec(&row.margin),
        leverage: dec(&row.leverage),
        liquidation_price: dec(&row.liquidation_price),
        timestamp: ts_rfc3339(&row.created_at),
        is_open: row.status.as_deref() == Some("OPEN"),
    }
}

fn from_perp_protocol(address: &str, row: &PerpProtocolPositionRow) -> PerpPosition {
    PerpPosition {
        address: address.to_string(),
        exchange: "perp_protocol".into(),
        symbol: text(&row.base_token),
        side: text(&row.side),
        size: dec(&row.size),
        entry_price: dec(&row.entry_price),
        current_price: dec(&row.mark_price),
        unrealized_pnl: dec(&row.unrealized_pnl),
        realized_pnl: dec(&row.realized_pnl),
        margin: dec(&row.margin),
        leverage: dec(&row.leverage),
        liquidation_price: dec(&row.liquidation_price),
        timestamp: ts_secs(&row.timestamp),
        is_open: true,
    }
}

fn from_mux(address: &str, row: &MuxPositionRow) -> PerpPosition {
    PerpPosition {
        address: address.to_string(),
        exchange: "mux".into(),
        symbol: text(&row.symbol),
        side: text(&row.side),
        size: dec(&row.size),
        entry_price: dec(&row.entry_price),
        current_price: dec(&row.mark_price),
        unrealized_pnl: dec(&row.unrealized_pnl),
        realized_pnl: dec(&row.realized_pnl),
        margin: dec(&row.margin),
        leverage: dec(&row.leverage),
        liquidation_price: dec(&row.liquidation_price),
        timestamp: ts_rfc3339(&row.timestamp),
        is_open: row.is_open.unwrap_or(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dydx_row_conversion() {
        let row = DydxPositionRow {
            market: Some("ETH-USD".into()),
            side: Some("LONG".into()),
            size: Some("2.5".into()),
            entry_price: Some("2000".into()),
            oracle_price: Some("2100".into()),
            unrealized_pnl: Some("250".into()),
            realized_pnl: Some("-50".into()),
            margin: Some("500".into()),
            leverage: Some("10".into()),
            liquidation_price: Some("1800".into()),
            status: Some("OPEN".into()),
            created_at: Some("2024-05-01T12:00:00Z".into()),
        };

        let pos = from_dydx("0xwallet", &row);
        assert_eq!(pos.exchange, "dydx");
        assert_eq!(pos.size, Decimal::new(25, 1));
        assert_eq!(pos.total_pnl(), Decimal::from(200));
        assert!(pos.is_open);
    }

    #[test]
    fn test_dydx_closed_position_is_not_open() {
        let row = DydxPositionRow {
            market: None,
            side: None,
            size: None,
            entry_price: None,
            oracle_price: None,
            unrealized_pnl: None,
            realized_pnl: None,
            margin: None,
            leverage: None,
            liquidation_price: None,
            status: Some("CLOSED".into()),
            created_at: None,
        };
        assert!(!from_dydx("0xwallet", &row).is_open);
    }

    #[test]
    fn test_malformed_numbers_become_zero() {
        let row = GmxPositionRow {
            market: Some("ETH".into()),
            side: Some("long".into()),
            size: Some("not-a-number".into()),
            collateral: None,
            entry_price: Some("2000".into()),
            mark_price: None,
            pnl: None,
            leverage: None,
            timestamp: Some("1714560000".into()),
        };

        let pos = from_gmx("0xwallet", &row);
        assert_eq!(pos.size, Decimal::ZERO);
        assert_eq!(pos.entry_price, Decimal::from(2000));
        assert_eq!(pos.timestamp.timestamp(), 1_714_560_000);
    }
}
