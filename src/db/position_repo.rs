use sqlx::PgPool;

use crate::models::{LiquidityPosition, PerpPosition};

/// Append perpetual-position snapshots. Positions have no natural key, so
/// every observation is a new row.
pub async fn insert_perp_positions(pool: &PgPool, positions: &[PerpPosition]) -> anyhow::Result<()> {
    for p in positions {
        sqlx::query(
            r#"
            INSERT INTO perp_positions (
                address, exchange, symbol, side, size, entry_price,
                current_price, unrealized_pnl, realized_pnl, margin, leverage,
                liquidation_price, ts, is_open
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&p.address)
        .bind(&p.exchange)
        .bind(&p.symbol)
        .bind(&p.side)
        .bind(p.size)
        .bind(p.entry_price)
        .bind(p.current_price)
        .bind(p.unrealized_pnl)
        .bind(p.realized_pnl)
        .bind(p.margin)
        .bind(p.leverage)
        .bind(p.liquidation_price)
        .bind(p.timestamp)
        .bind(p.is_open)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Append liquidity-position snapshots.
pub async fn insert_liquidity_positions(
    pool: &PgPool,
    positions: &[LiquidityPosition],
) -> anyhow::Result<()> {
    for p in positions {
        sqlx::query(
            r#"
            INSERT INTO liquidity_positions (
                address, protocol, pair, token0, token1, amount0, amount1,
                shares, apr, fees_earned, impermanent_loss, ts
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&p.address)
        .bind(&p.protocol)
        .bind(&p.pair)
        .bind(&p.token0)
        .bind(&p.token1)
        .bind(p.amount0)
        .bind(p.amount1)
        .bind(p.shares)
        .bind(p.apr)
        .bind(p.fees_earned)
        .bind(p.impermanent_loss)
        .bind(p.timestamp)
        .execute(pool)
        .await?;
    }

    Ok(())
}
