use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use crate::models::{LiquidityPosition, PerpPosition, TradingPattern, Transaction, WalletProfile};

/// Average USD trade size above which a wallet is considered a large trader.
fn large_trade_usd() -> Decimal {
    Decimal::from(100_000)
}

/// Daily trade count above which a wallet is considered high-frequency.
fn high_frequency_daily_trades() -> Decimal {
    Decimal::from(10)
}

/// Build the full behavioral profile for one wallet.
///
/// Pure aggregation over the transaction and position sets passed in —
/// recomputed wholesale each pass, no hidden cross-pass state. Transactions
/// are expected in timestamp-descending order.
pub fn build_profile(
    address: &str,
    txs: &[Transaction],
    perps: &[PerpPosition],
    lps: &[LiquidityPosition],
    now: DateTime<Utc>,
) -> WalletProfile {
    WalletProfile {
        address: address.to_string(),
        total_value_usd: total_value_usd(txs, perps, lps),
        total_pnl: total_pnl(txs, perps),
        win_rate: win_rate(txs),
        total_trades: txs.len() as i64,
        avg_trade_size: avg_trade_size(txs),
        risk_score: risk_score(txs, perps),
        activity_score: activity_score(txs, now),
        top_tokens: top_tokens(txs),
        preferred_venues: preferred_venues(txs),
        trading_pattern: trading_pattern(txs),
        last_activity: txs.first().map(|t| t.timestamp).unwrap_or(now),
        tags: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// PnL and trade-size metrics
// ---------------------------------------------------------------------------

/// Realized transaction PnL plus unrealized perpetual PnL.
pub fn total_pnl(txs: &[Transaction], perps: &[PerpPosition]) -> Decimal {
    let realized = txs.iter().map(|t| t.profit_loss).sum::<Decimal>();
    let unrealized = perps.iter().map(|p| p.unrealized_pnl).sum::<Decimal>();
    realized + unrealized
}

/// Percentage of profitable transactions among PnL-bearing ones, in [0, 100].
/// Zero-PnL transactions are excluded from the denominator; no PnL-bearing
/// transactions at all yields 0, never a division error.
pub fn win_rate(txs: &[Transaction]) -> Decimal {
    let decided = txs.iter().filter(|t| t.profit_loss != Decimal::ZERO).count();
    if decided == 0 {
        return Decimal::ZERO;
    }

    let wins = txs.iter().filter(|t| t.profit_loss > Decimal::ZERO).count();
    Decimal::from(wins as i64) / Decimal::from(decided as i64) * Decimal::ONE_HUNDRED
}

/// Mean USD notional per transaction; 0 when there are none.
pub fn avg_trade_size(txs: &[Transaction]) -> Decimal {
    if txs.is_empty() {
        return Decimal::ZERO;
    }

    txs.iter().map(|t| t.notional_usd()).sum::<Decimal>() / Decimal::from(txs.len() as i64)
}

/// Transaction USD volume plus perpetual margin plus net LP token amounts —
/// a point-in-time estimate, not a reconciled balance.
pub fn total_value_usd(
    txs: &[Transaction],
    perps: &[PerpPosition],
    lps: &[LiquidityPosition],
) -> Decimal {
    let volume = txs.iter().map(|t| t.notional_usd()).sum::<Decimal>();
    let margin = perps.iter().map(|p| p.margin).sum::<Decimal>();
    let lp_value = lps.iter().map(|p| p.amount0 + p.amount1).sum::<Decimal>();
    volume + margin + lp_value
}

// ---------------------------------------------------------------------------
// Risk score
// ---------------------------------------------------------------------------

/// Additive risk score clamped to [0, 100]:
/// - up to 30 points scaled by average open-position leverage (leverage/10, capped at 1)
/// - up to 25 points scaled by the fraction of MEV-flagged transactions
/// - flat 25 points when the average trade exceeds the large-trade threshold
/// - flat 20 points when daily trade frequency exceeds the high-frequency threshold
pub fn risk_score(txs: &[Transaction], perps: &[PerpPosition]) -> Decimal {
    let mut score = Decimal::ZERO;

    if !perps.is_empty() {
        let avg_leverage =
            perps.iter().map(|p| p.leverage).sum::<Decimal>() / Decimal::from(perps.len() as i64);
        let leverage_factor = (avg_leverage / Decimal::from(10)).min(Decimal::ONE);
        score += leverage_factor * Decimal::from(30);
    }

    if !txs.is_empty() {
        let mev_count = txs.iter().filter(|t| t.mev_suspected).count();
        let mev_ratio = Decimal::from(mev_count as i64) / Decimal::from(txs.len() as i64);
        score += mev_ratio * Decimal::from(25);

        if avg_trade_size(txs) > large_trade_usd() {
            score += Decimal::from(25);
        }

        let daily_trades = Decimal::from(txs.len() as i64) / Decimal::from(30);
        if daily_trades > high_frequency_daily_trades() {
            score += Decimal::from(20);
        }
    }

    score.min(Decimal::ONE_HUNDRED).max(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Activity score
// ---------------------------------------------------------------------------

/// Recent-activity, venue-diversity, and volume components, summed and
/// clamped to [0, 100].
pub fn activity_score(txs: &[Transaction], now: DateTime<Utc>) -> Decimal {
    if txs.is_empty() {
        return Decimal::ZERO;
    }

    let week_ago = now - Duration::days(7);
    let recent = txs.iter().filter(|t| t.timestamp > week_ago).count();
    let recent_score = Decimal::from(recent as i64) / Decimal::from(7) * Decimal::from(10);

    let venues: HashSet<&str> = txs.iter().map(|t| t.venue.as_str()).collect();
    let diversity_score =
        (Decimal::from(venues.len() as i64) * Decimal::from(5)).min(Decimal::from(30));

    let volume = txs.iter().map(|t| t.notional_usd()).sum::<Decimal>();
    let volume_score = (volume / Decimal::from(10_000)).min(Decimal::from(40));

    (recent_score + diversity_score + volume_score).min(Decimal::ONE_HUNDRED)
}

// ---------------------------------------------------------------------------
// Trading pattern
// ---------------------------------------------------------------------------

/// Cadence label from the mean gap between consecutive transactions.
/// Requires timestamp-descending order.
pub fn trading_pattern(txs: &[Transaction]) -> TradingPattern {
    match txs.len() {
        0 => return TradingPattern::Inactive,
        1 => return TradingPattern::SingleTrade,
        _ => {}
    }

    let gaps: Vec<i64> = txs
        .windows(2)
        .map(|w| (w[0].timestamp - w[1].timestamp).num_seconds())
        .collect();
    let mean_gap = gaps.iter().sum::<i64>() / gaps.len() as i64;

    if mean_gap < 3_600 {
        TradingPattern::HighFrequency
    } else if mean_gap < 86_400 {
        TradingPattern::DayTrader
    } else if mean_gap < 604_800 {
        TradingPattern::ActiveTrader
    } else {
        TradingPattern::LongTermHolder
    }
}

// ---------------------------------------------------------------------------
// Frequency rankings
// ---------------------------------------------------------------------------

/// Most-traded token symbols, descending by count, at most 10. Ties keep
/// first-encountered order (stable sort).
pub fn top_tokens(txs: &[Transaction]) -> Vec<String> {
    ranked_by_frequency(txs.iter().map(|t| t.token.as_str()), 10)
}

/// Most-used venues, descending by count, at most 5. Unresolved venues are
/// excluded.
pub fn preferred_venues(txs: &[Transaction]) -> Vec<String> {
    ranked_by_frequency(
        txs.iter()
            .map(|t| t.venue.as_str())
            .filter(|v| !v.is_empty() && *v != "unknown"),
        5,
    )
}

fn ranked_by_frequency<'a>(items: impl Iterator<Item = &'a str>, cap: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for item in items {
        let count = counts.entry(item).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }

    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().take(cap).map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

/// Qualitative, order-stable insight lines derived from threshold checks.
/// Purely presentational — downstream consumers receive them as free text.
pub fn generate_insights(
    profile: &WalletProfile,
    txs: &[Transaction],
    perps: &[PerpPosition],
    lps: &[LiquidityPosition],
) -> Vec<String> {
    let mut insights = Vec::new();

    if profile.activity_score > Decimal::from(80) {
        insights.push("Highly active trader with frequent transactions".to_string());
    } else if profile.activity_score < Decimal::from(20) {
        insights.push("Low activity, mostly holding positions".to_string());
    }

    if profile.risk_score > Decimal::from(70) {
        insights.push("High risk profile: heavy leverage or MEV strategies".to_string());
    } else if profile.risk_score < Decimal::from(30) {
        insights.push("Conservative trader with low risk exposure".to_string());
    }

    if profile.win_rate > Decimal::from(70) {
        insights.push("High win rate across resolved trades".to_string());
    } else if profile.win_rate < Decimal::from(30) && profile.win_rate > Decimal::ZERO {
        insights.push("Low win rate across resolved trades".to_string());
    }

    if !perps.is_empty() {
        let avg_leverage =
            perps.iter().map(|p| p.leverage).sum::<Decimal>() / Decimal::from(perps.len() as i64);
        if avg_leverage > Decimal::from(10) {
            insights.push("High leverage perpetual trader".to_string());
        }
        if perps.iter().map(|p| p.total_pnl()).sum::<Decimal>() > Decimal::ZERO {
            insights.push("Profitable in perpetual trading".to_string());
        }
    }

    if !lps.is_empty() {
        insights.push("Provides liquidity to DeFi protocols".to_string());
        let fees = lps.iter().map(|p| p.fees_earned).sum::<Decimal>();
        if fees > Decimal::from(1_000) {
            insights.push("Earning significant fees from liquidity provision".to_string());
        }
    }

    if txs.iter().any(|t| t.mev_suspected) {
        insights.push("Involved in MEV activity".to_string());
    }

    if !profile.top_tokens.is_empty() {
        let favorites = profile.top_tokens.iter().take(3).cloned().collect::<Vec<_>>();
        insights.push(format!("Prefers trading: {}", favorites.join(", ")));
    }

    insights
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
