use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category assigned by the classifier rule cascade.
///
/// Closed set: `Unknown` is the terminal fallback, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxCategory {
    SpotBuy,
    SpotSell,
    PerpOpen,
    LiquidityAdd,
    LiquidityRemove,
    Lending,
    Unknown,
}

impl TxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxCategory::SpotBuy => "spot_buy",
            TxCategory::SpotSell => "spot_sell",
            TxCategory::PerpOpen => "perp_open",
            TxCategory::LiquidityAdd => "liquidity_add",
            TxCategory::LiquidityRemove => "liquidity_remove",
            TxCategory::Lending => "lending",
            TxCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical, provider-agnostic transaction. Every raw record is normalized
/// into this shape before classification and scoring. Identity is `hash`;
/// re-ingestion re-classifies and upserts idempotently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub from_address: String,
    pub to_address: String,
    /// Amount in token-native units.
    pub amount: Decimal,
    pub token: String,
    pub timestamp: DateTime<Utc>,
    pub chain: String,
    pub category: TxCategory,
    /// Gas fee in native-currency units.
    pub gas_fee: Decimal,
    pub block_number: i64,
    /// Resolved exchange/venue name, `"unknown"` when unmatched.
    pub venue: String,
    /// USD price of `token` at execution time. Zero means valuation unknown.
    pub price_usd: Decimal,
    pub profit_loss: Decimal,
    pub slippage: Decimal,
    pub mev_suspected: bool,
    pub arbitrage_suspected: bool,
    pub tags: Vec<String>,
    /// Original provider payload, retained opaque for audit.
    pub raw: serde_json::Value,
}

impl Transaction {
    /// USD notional of this transaction; zero when the price is unresolved.
    pub fn notional_usd(&self) -> Decimal {
        self.amount * self.price_usd
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hashes come from providers unvalidated; truncate on char
        // boundaries, not bytes.
        let short: String = self.hash.chars().take(10).collect();
        write!(
            f,
            "Tx: hash={} chain={} category={} token={} amount={} venue={}",
            short, self.chain, self.category, self.token, self.amount, self.venue,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_tx(hash: &str) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            from_address: "0xfrom".into(),
            to_address: "0xto".into(),
            amount: Decimal::ONE,
            token: "ETH".into(),
            timestamp: Utc::now(),
            chain: "ethereum".into(),
            category: TxCategory::Unknown,
            gas_fee: Decimal::ZERO,
            block_number: 0,
            venue: "unknown".into(),
            price_usd: Decimal::ZERO,
            profit_loss: Decimal::ZERO,
            slippage: Decimal::ZERO,
            mev_suspected: false,
            arbitrage_suspected: false,
            tags: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_display_truncates_hash() {
        let rendered = make_tx("0xabcdef0123456789").to_string();
        assert!(rendered.contains("hash=0xabcdef01 "));
    }

    #[test]
    fn test_display_handles_multibyte_hash() {
        // A malformed provider hash with multi-byte chars must not panic.
        let rendered = make_tx("0xζζζζζζζζζζζζ").to_string();
        assert!(rendered.contains("chain=ethereum"));
    }

    #[test]
    fn test_display_handles_short_hash() {
        let rendered = make_tx("0x1").to_string();
        assert!(rendered.contains("hash=0x1 "));
    }
}
