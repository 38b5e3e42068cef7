use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of a perpetual-derivative position.
///
/// Positions have no natural primary key; every observation is appended.
/// The system never reconciles successive snapshots into a time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerpPosition {
    pub address: String,
    pub exchange: String,
    pub symbol: String,
    pub side: String,
    pub size: Decimal,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub margin: Decimal,
    pub leverage: Decimal,
    pub liquidation_price: Decimal,
    pub timestamp: DateTime<Utc>,
    pub is_open: bool,
}

impl PerpPosition {
    pub fn total_pnl(&self) -> Decimal {
        self.unrealized_pnl + self.realized_pnl
    }
}

/// Point-in-time snapshot of a liquidity-provision position.
/// Amounts are deposits net of withdrawals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityPosition {
    pub address: String,
    pub protocol: String,
    pub pair: String,
    pub token0: String,
    pub token1: String,
    pub amount0: Decimal,
    pub amount1: Decimal,
    pub shares: Decimal,
    pub apr: Decimal,
    pub fees_earned: Decimal,
    pub impermanent_loss: Decimal,
    pub timestamp: DateTime<Utc>,
}
