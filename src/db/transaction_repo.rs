use sqlx::PgPool;

use crate::models::Transaction;

/// Upsert transactions keyed by hash. Re-analyzing a wallet re-classifies
/// old transactions in place rather than duplicating them.
pub async fn upsert_transactions(pool: &PgPool, txs: &[Transaction]) -> anyhow::Result<()> {
    for tx in txs {
        sqlx::query(
            r#"
            INSERT INTO wallet_transactions (
                hash, from_address, to_address, amount, token, ts, chain,
                category, gas_fee, block_number, venue, price_usd,
                profit_loss, slippage, mev_suspected, arbitrage_suspected,
                tags, raw
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (hash) DO UPDATE SET
                category = EXCLUDED.category,
                venue = EXCLUDED.venue,
                price_usd = EXCLUDED.price_usd,
                profit_loss = EXCLUDED.profit_loss,
                slippage = EXCLUDED.slippage,
                mev_suspected = EXCLUDED.mev_suspected,
                arbitrage_suspected = EXCLUDED.arbitrage_suspected,
                tags = EXCLUDED.tags
            "#,
        )
        .bind(&tx.hash)
        .bind(&tx.from_address)
        .bind(&tx.to_address)
        .bind(tx.amount)
        .bind(&tx.token)
        .bind(tx.timestamp)
        .bind(&tx.chain)
        .bind(tx.category.as_str())
        .bind(tx.gas_fee)
        .bind(tx.block_number)
        .bind(&tx.venue)
        .bind(tx.price_usd)
        .bind(tx.profit_loss)
        .bind(tx.slippage)
        .bind(tx.mev_suspected)
        .bind(tx.arbitrage_suspected)
        .bind(tx.tags.join(","))
        .bind(tx.raw.to_string())
        .execute(pool)
        .await?;
    }

    Ok(())
}
