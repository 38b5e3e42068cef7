use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::models::{RecordKind, Transaction, TxCategory};
use crate::providers::explorer::ChainEndpoint;

/// Wei per native unit — explorer amounts and gas figures come in wei.
fn wei_per_native() -> Decimal {
    Decimal::from(1_000_000_000_000_000_000u64)
}

/// Convert one raw explorer record into a canonical transaction.
///
/// Classification and price enrichment happen afterwards; the record comes
/// out with `Unknown` category, zero flags, and the raw payload retained for
/// audit. Records without a hash are dropped — they cannot be upserted.
pub fn normalize_record(
    raw: &Value,
    kind: RecordKind,
    chain: &ChainEndpoint,
) -> Option<Transaction> {
    let hash = str_field(raw, "hash")?;

    let amount = dec_field(raw, "value") / wei_per_native();
    let gas_fee = dec_field(raw, "gasUsed") * dec_field(raw, "gasPrice") / wei_per_native();

    let token = match kind {
        RecordKind::Token | RecordKind::Nft => str_field(raw, "tokenSymbol")
            .unwrap_or_else(|| chain.native_symbol.clone()),
        RecordKind::Native | RecordKind::Internal => chain.native_symbol.clone(),
    };

    Some(Transaction {
        hash,
        from_address: str_field(raw, "from").unwrap_or_default(),
        to_address: str_field(raw, "to").unwrap_or_default(),
        amount,
        token,
        timestamp: timestamp_field(raw, "timeStamp"),
        chain: chain.name.clone(),
        category: TxCategory::Unknown,
        gas_fee,
        block_number: int_field(raw, "blockNumber"),
        venue: "unknown".into(),
        price_usd: Decimal::ZERO,
        // Realized PnL is computed upstream of the profile aggregator; the
        // normalizer only carries the field through.
        profit_loss: Decimal::ZERO,
        slippage: Decimal::ZERO,
        mev_suspected: false,
        arbitrage_suspected: false,
        tags: Vec::new(),
        raw: raw.clone(),
    })
}

fn str_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Explorer numeric fields are decimal strings; unparseable values count as
/// zero rather than failing the record.
fn dec_field(raw: &Value, key: &str) -> Decimal {
    raw.get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| Decimal::from_str(s).ok())
        .unwrap_or(Decimal::ZERO)
}

fn int_field(raw: &Value, key: &str) -> i64 {
    raw.get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or_default()
}

fn timestamp_field(raw: &Value, key: &str) -> DateTime<Utc> {
    raw.get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::explorer::ProviderKeys;
    use serde_json::json;

    fn eth_endpoint() -> ChainEndpoint {
        ChainEndpoint {
            name: "ethereum".into(),
            base_url: "https://api.etherscan.io/api".into(),
            native_symbol: "ETH".into(),
            keys: ProviderKeys::default(),
        }
    }

    #[test]
    fn test_normalize_native_record() {
        let raw = json!({
            "hash": "0xabc123",
            "from": "0xfrom",
            "to": "0xto",
            "value": "2500000000000000000",
            "timeStamp": "1700000000",
            "gasUsed": "21000",
            "gasPrice": "100000000000",
            "blockNumber": "18000000",
            "input": "0x"
        });

        let tx = normalize_record(&raw, RecordKind::Native, &eth_endpoint())
            .expect("record with hash should normalize");

        assert_eq!(tx.hash, "0xabc123");
        assert_eq!(tx.amount, Decimal::new(25, 1)); // 2.5 ETH
        assert_eq!(tx.token, "ETH");
        assert_eq!(tx.chain, "ethereum");
        assert_eq!(tx.block_number, 18_000_000);
        assert_eq!(tx.category, TxCategory::Unknown);
        // 21000 * 100 gwei = 0.0021 ETH
        assert_eq!(tx.gas_fee, Decimal::new(21, 4));
        assert_eq!(tx.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(tx.raw, raw);
    }

    #[test]
    fn test_token_record_uses_token_symbol() {
        let raw = json!({
            "hash": "0xdef",
            "value": "1000000000000000000",
            "tokenSymbol": "UNI",
            "timeStamp": "1700000000"
        });

        let tx = normalize_record(&raw, RecordKind::Token, &eth_endpoint()).unwrap();
        assert_eq!(tx.token, "UNI");
        assert_eq!(tx.amount, Decimal::ONE);
    }

    #[test]
    fn test_record_without_hash_is_dropped() {
        let raw = json!({"value": "1"});
        assert!(normalize_record(&raw, RecordKind::Native, &eth_endpoint()).is_none());
    }

    #[test]
    fn test_garbage_numerics_default_to_zero() {
        let raw = json!({"hash": "0x1", "value": "not-a-number", "timeStamp": "garbage"});
        let tx = normalize_record(&raw, RecordKind::Native, &eth_endpoint()).unwrap();
        assert_eq!(tx.amount, Decimal::ZERO);
        assert_eq!(tx.timestamp, DateTime::UNIX_EPOCH);
    }
}
