use sqlx::PgPool;

use crate::models::WalletProfile;

/// Upsert a wallet's profile keyed by address. The profile is a derived
/// projection, so the latest pass always wins wholesale.
pub async fn upsert_profile(pool: &PgPool, profile: &WalletProfile) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO wallet_profiles (
            address, total_value_usd, total_pnl, win_rate, total_trades,
            avg_trade_size, risk_score, activity_score, top_tokens,
            preferred_venues, trading_pattern, last_activity, tags
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (address) DO UPDATE SET
            total_value_usd = EXCLUDED.total_value_usd,
            total_pnl = EXCLUDED.total_pnl,
            win_rate = EXCLUDED.win_rate,
            total_trades = EXCLUDED.total_trades,
            avg_trade_size = EXCLUDED.avg_trade_size,
            risk_score = EXCLUDED.risk_score,
            activity_score = EXCLUDED.activity_score,
            top_tokens = EXCLUDED.top_tokens,
            preferred_venues = EXCLUDED.preferred_venues,
            trading_pattern = EXCLUDED.trading_pattern,
            last_activity = EXCLUDED.last_activity,
            tags = EXCLUDED.tags
        "#,
    )
    .bind(&profile.address)
    .bind(profile.total_value_usd)
    .bind(profile.total_pnl)
    .bind(profile.win_rate)
    .bind(profile.total_trades)
    .bind(profile.avg_trade_size)
    .bind(profile.risk_score)
    .bind(profile.activity_score)
    .bind(profile.top_tokens.join(","))
    .bind(profile.preferred_venues.join(","))
    .bind(profile.trading_pattern.as_str())
    .bind(profile.last_activity)
    .bind(profile.tags.join(","))
    .execute(pool)
    .await?;

    Ok(())
}
