use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::TxCategory;

/// Trading cadence label derived from the mean gap between consecutive
/// transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingPattern {
    HighFrequency,
    DayTrader,
    ActiveTrader,
    LongTermHolder,
    SingleTrade,
    Inactive,
}

impl TradingPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingPattern::HighFrequency => "high_frequency",
            TradingPattern::DayTrader => "day_trader",
            TradingPattern::ActiveTrader => "active_trader",
            TradingPattern::LongTermHolder => "long_term_holder",
            TradingPattern::SingleTrade => "single_trade",
            TradingPattern::Inactive => "inactive",
        }
    }
}

impl fmt::Display for TradingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite behavioral profile for one wallet. Recomputed wholesale on
/// every analysis pass and upserted by address — a derived projection,
/// never incrementally patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletProfile {
    pub address: String,
    pub total_value_usd: Decimal,
    pub total_pnl: Decimal,
    /// Percentage in [0, 100].
    pub win_rate: Decimal,
    pub total_trades: i64,
    pub avg_trade_size: Decimal,
    /// Clamped to [0, 100].
    pub risk_score: Decimal,
    /// Clamped to [0, 100].
    pub activity_score: Decimal,
    /// Frequency-ranked, at most 10.
    pub top_tokens: Vec<String>,
    /// Frequency-ranked, at most 5. Unresolved venues excluded.
    pub preferred_venues: Vec<String>,
    pub trading_pattern: TradingPattern,
    pub last_activity: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// Digest returned by one `analyze_wallet` pass, consumed by the operator
/// surface as free text.
#[derive(Debug, Clone, Serialize)]
pub struct WalletSummary {
    pub address: String,
    pub profile: WalletProfile,
    pub total_transactions: usize,
    /// Transactions in the trailing 7 days.
    pub recent_transactions: usize,
    pub transactions_by_category: Vec<(TxCategory, usize)>,
    pub perp_positions: usize,
    pub open_perp_positions: usize,
    pub total_perp_pnl: Decimal,
    pub liquidity_positions: usize,
    pub total_fees_earned: Decimal,
    pub insights: Vec<String>,
}

impl fmt::Display for WalletSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Wallet {}", self.address)?;
        writeln!(
            f,
            "  pattern={} risk={} activity={} win_rate={}% trades={}",
            self.profile.trading_pattern,
            self.profile.risk_score,
            self.profile.activity_score,
            self.profile.win_rate,
            self.profile.total_trades,
        )?;
        writeln!(
            f,
            "  pnl={} avg_trade={} volume_usd={}",
            self.profile.total_pnl, self.profile.avg_trade_size, self.profile.total_value_usd,
        )?;
        writeln!(
            f,
            "  transactions={} (recent={}) perp={}/{} open (pnl={}) lp={} (fees={})",
            self.total_transactions,
            self.recent_transactions,
            self.open_perp_positions,
            self.perp_positions,
            self.total_perp_pnl,
            self.liquidity_positions,
            self.total_fees_earned,
        )?;
        for (category, count) in &self.transactions_by_category {
            writeln!(f, "    {category}: {count}")?;
        }
        for insight in &self.insights {
            writeln!(f, "  - {insight}")?;
        }
        Ok(())
    }
}
