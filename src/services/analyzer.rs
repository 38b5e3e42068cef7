use chrono::{Duration, Utc};
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::time::Instant;

use crate::analytics::profiler::{build_profile, generate_insights};
use crate::db::{position_repo, profile_repo, transaction_repo};
use crate::errors::AnalyzerError;
use crate::models::{
    LiquidityPosition, PerpPosition, Transaction, TxCategory, WalletProfile, WalletSummary,
};
use crate::services::{LiquidityTracker, PerpTracker, TransactionAggregator};

/// Display order for the per-category breakdown in summaries.
const CATEGORY_ORDER: [TxCategory; 7] = [
    TxCategory::SpotBuy,
    TxCategory::SpotSell,
    TxCategory::PerpOpen,
    TxCategory::LiquidityAdd,
    TxCategory::LiquidityRemove,
    TxCategory::Lending,
    TxCategory::Unknown,
];

/// Top-level orchestrator. One `analyze_wallet` call aggregates, profiles,
/// persists, and returns the digest for one address.
pub struct WalletAnalyzer {
    transactions: TransactionAggregator,
    perps: PerpTracker,
    liquidity: LiquidityTracker,
    pool: PgPool,
}

impl WalletAnalyzer {
    pub fn new(
        transactions: TransactionAggregator,
        perps: PerpTracker,
        liquidity: LiquidityTracker,
        pool: PgPool,
    ) -> Self {
        Self {
            transactions,
            perps,
            liquidity,
            pool,
        }
    }

    /// Run one full analysis pass for `address`.
    ///
    /// The three aggregation stages run as independent tasks. Provider
    /// failures inside a stage degrade to empty results; only a stage that
    /// fails to join (panic or cancellation) aborts the pass. The summary is
    /// computed before persistence, so a persistence error means the results
    /// were produced but not stored.
    pub async fn analyze_wallet(&self, address: &str) -> Result<WalletSummary, AnalyzerError> {
        let start = Instant::now();
        tracing::info!(wallet = address, "Starting wallet analysis");

        let tx_task = {
            let aggregator = self.transactions.clone();
            let address = address.to_string();
            tokio::spawn(async move { aggregator.fetch_all(&address).await })
        };
        let perp_task = {
            let tracker = self.perps.clone();
            let address = address.to_string();
            tokio::spawn(async move { tracker.track(&address).await })
        };
        let lp_task = {
            let tracker = self.liquidity.clone();
            let address = address.to_string();
            tokio::spawn(async move { tracker.track(&address).await })
        };

        let (txs, perps, lps) = tokio::try_join!(tx_task, perp_task, lp_task)
            .map_err(|e| AnalyzerError::Aggregation(e.to_string()))?;

        let now = Utc::now();
        let profile = build_profile(address, &txs, &perps, &lps, now);
        let insights = generate_insights(&profile, &txs, &perps, &lps);
        let summary = build_summary(address, profile, insights, &txs, &perps, &lps, now);

        self.persist(&txs, &perps, &lps, &summary.profile).await?;

        counter!("wallets_analyzed_total").increment(1);
        histogram!("analysis_latency_seconds").record(start.elapsed().as_secs_f64());
        tracing::info!(
            wallet = address,
            transactions = summary.total_transactions,
            perp_positions = summary.perp_positions,
            liquidity_positions = summary.liquidity_positions,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Wallet analysis complete"
        );

        Ok(summary)
    }

    async fn persist(
        &self,
        txs: &[Transaction],
        perps: &[PerpPosition],
        lps: &[LiquidityPosition],
        profile: &WalletProfile,
    ) -> anyhow::Result<()> {
        transaction_repo::upsert_transactions(&self.pool, txs).await?;
        position_repo::insert_perp_positions(&self.pool, perps).await?;
        position_repo::insert_liquidity_positions(&self.pool, lps).await?;
        profile_repo::upsert_profile(&self.pool, profile).await?;
        Ok(())
    }
}

fn build_summary(
    address: &str,
    profile: WalletProfile,
    insights: Vec<String>,
    txs: &[Transaction],
    perps: &[PerpPosition],
    lps: &[LiquidityPosition],
    now: chrono::DateTime<Utc>,
) -> WalletSummary {
    let week_ago = now - Duration::days(7);
    let recent = txs.iter().filter(|t| t.timestamp > week_ago).count();

    let transactions_by_category = CATEGORY_ORDER
        .iter()
        .map(|&category| {
            let count = txs.iter().filter(|t| t.category == category).count();
            (category, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();

    WalletSummary {
        address: address.to_string(),
        profile,
        total_transactions: txs.len(),
        recent_transactions: recent,
        transactions_by_category,
        perp_positions: perps.len(),
        open_perp_positions: perps.iter().filter(|p| p.is_open).count(),
        total_perp_pnl: perps.iter().map(|p| p.total_pnl()).sum::<Decimal>(),
        liquidity_positions: lps.len(),
        total_fees_earned: lps.iter().map(|p| p.fees_earned).sum::<Decimal>(),
        insights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradingPattern;
    use chrono::DateTime;

    fn make_tx(hash: &str, category: TxCategory, minutes_ago: i64) -> Transaction {
        let now = Utc::now();
        Transaction {
            hash: hash.to_string(),
            from_address: "0xfrom".into(),
            to_address: "0xto".into(),
            amount: Decimal::ONE,
            token: "ETH".into(),
            timestamp: now - Duration::minutes(minutes_ago),
            chain: "ethereum".into(),
            category,
            gas_fee: Decimal::ZERO,
            block_number: 0,
            venue: "uniswap".into(),
            price_usd: Decimal::from(2_000),
            profit_loss: Decimal::ZERO,
            slippage: Decimal::ZERO,
            mev_suspected: false,
            arbitrage_suspected: false,
            tags: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_summary_counts_by_category_skip_zero() {
        let now = Utc::now();
        let txs = vec![
            make_tx("0xa", TxCategory::SpotBuy, 1),
            make_tx("0xb", TxCategory::SpotBuy, 2),
            make_tx("0xc", TxCategory::Lending, 3),
        ];
        let profile = build_profile("0xw", &txs, &[], &[], now);
        let summary = build_summary("0xw", profile, Vec::new(), &txs, &[], &[], now);

        assert_eq!(
            summary.transactions_by_category,
            vec![(TxCategory::SpotBuy, 2), (TxCategory::Lending, 1)]
        );
        assert_eq!(summary.recent_transactions, 3);
        assert_eq!(summary.total_transactions, 3);
    }

    #[test]
    fn test_summary_recent_window_excludes_old_activity() {
        let now = Utc::now();
        let txs = vec![
            make_tx("0xa", TxCategory::SpotBuy, 60),
            make_tx("0xb", TxCategory::SpotSell, 30 * 24 * 60),
        ];
        let profile = build_profile("0xw", &txs, &[], &[], now);
        let summary = build_summary("0xw", profile, Vec::new(), &txs, &[], &[], now);

        assert_eq!(summary.recent_transactions, 1);
    }

    #[test]
    fn test_empty_wallet_summary() {
        let now = Utc::now();
        let profile = build_profile("0xempty", &[], &[], &[], now);
        let summary = build_summary("0xempty", profile, Vec::new(), &[], &[], &[], now);

        assert_eq!(summary.total_transactions, 0);
        assert_eq!(summary.profile.trading_pattern, TradingPattern::Inactive);
        assert!(summary.transactions_by_category.is_empty());
        assert_eq!(summary.total_perp_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_summary_display_renders_without_panic() {
        let now = DateTime::UNIX_EPOCH;
        let profile = build_profile("0xw", &[], &[], &[], now);
        let summary = build_summary("0xw", profile, vec!["Low activity".into()], &[], &[], &[], now);
        let rendered = summary.to_string();
        assert!(rendered.contains("0xw"));
        assert!(rendered.contains("Low activity"));
    }
}
