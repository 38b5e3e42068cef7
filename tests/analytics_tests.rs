use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use walletlens::analytics::profiler::{build_profile, generate_insights};
use walletlens::analytics::{normalize_record, AddressBook, Classifier};
use walletlens::models::{PerpPosition, RecordKind, TradingPattern, TxCategory};
use walletlens::providers::{ChainEndpoint, ProviderKeys};

const UNISWAP_V2_ROUTER: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";

fn eth_endpoint() -> ChainEndpoint {
    ChainEndpoint {
        name: "ethereum".into(),
        base_url: "https://api.etherscan.io/api".into(),
        native_symbol: "ETH".into(),
        keys: ProviderKeys::default(),
    }
}

fn mainnet_classifier() -> Classifier {
    Classifier::new(AddressBook::mainnet_defaults())
}

#[test]
fn swap_to_uniswap_router_becomes_priced_spot_buy() {
    let raw = json!({
        "hash": "0xabc123",
        "from": "0xwallet",
        "to": UNISWAP_V2_ROUTER,
        "value": "5000000000000000000",
        "timeStamp": "1700000000",
        "gasUsed": "150000",
        "gasPrice": "40000000000",
        "blockNumber": "18000000",
        "input": "0x7ff36ab5000000000000000000000000"
    });

    let mut tx = normalize_record(&raw, RecordKind::Native, &eth_endpoint())
        .expect("record with hash should normalize");
    mainnet_classifier().annotate(&mut tx);

    assert_eq!(tx.category, TxCategory::SpotBuy);
    assert_eq!(tx.venue, "uniswap");
    assert_eq!(tx.amount, Decimal::from(5));
    assert!(!tx.mev_suspected);
    assert!(!tx.arbitrage_suspected);
}

#[test]
fn multi_hop_swap_payload_is_flagged_arbitrage_and_mev() {
    let raw = json!({
        "hash": "0xarb",
        "from": "0xwallet",
        "to": "0x0000000000000000000000000000000000000042",
        "value": "1000000000000000000",
        "timeStamp": "1700000000",
        "input": "swapExactTokensForTokens then swapExactETHForTokens"
    });

    let mut tx = normalize_record(&raw, RecordKind::Native, &eth_endpoint()).unwrap();
    mainnet_classifier().annotate(&mut tx);

    assert!(tx.arbitrage_suspected);
    assert!(tx.mev_suspected);
}

#[test]
fn empty_wallet_profiles_as_inactive_with_zero_scores() {
    let now = Utc::now();
    let profile = build_profile("0xempty", &[], &[], &[], now);

    assert_eq!(profile.total_trades, 0);
    assert_eq!(profile.risk_score, Decimal::ZERO);
    assert_eq!(profile.activity_score, Decimal::ZERO);
    assert_eq!(profile.win_rate, Decimal::ZERO);
    assert_eq!(profile.trading_pattern, TradingPattern::Inactive);
}

#[test]
fn win_rate_ignores_break_even_trades() {
    let now = Utc::now();
    let classifier = mainnet_classifier();

    let mut txs = Vec::new();
    for i in 0..10 {
        let raw = json!({
            "hash": format!("0x{i}"),
            "from": "0xwallet",
            "to": UNISWAP_V2_ROUTER,
            "value": "1000000000000000000",
            "timeStamp": (1_700_000_000 - i * 600).to_string(),
            "input": "0x7ff36ab5"
        });
        let mut tx = normalize_record(&raw, RecordKind::Native, &eth_endpoint()).unwrap();
        classifier.annotate(&mut tx);
        if i < 7 {
            tx.profit_loss = Decimal::from(100);
        }
        txs.push(tx);
    }

    let profile = build_profile("0xwallet", &txs, &[], &[], now);
    // 7 winners, 3 break-even: the break-even trades leave the denominator.
    assert_eq!(profile.win_rate, Decimal::ONE_HUNDRED);
    assert_eq!(profile.total_trades, 10);
}

#[test]
fn scores_stay_clamped_under_extreme_inputs() {
    let now = Utc::now();
    let classifier = mainnet_classifier();

    let mut txs = Vec::new();
    for i in 0..400 {
        let raw = json!({
            "hash": format!("0x{i}"),
            "from": "0xwallet",
            "to": UNISWAP_V2_ROUTER,
            "value": "9000000000000000000000",
            "timeStamp": (1_700_000_000 - i * 60).to_string(),
            "gasUsed": "1000000",
            "gasPrice": "500000000000000",
            "input": "0x7ff36ab5"
        });
        let mut tx = normalize_record(&raw, RecordKind::Native, &eth_endpoint()).unwrap();
        classifier.annotate(&mut tx);
        tx.price_usd = Decimal::from(100_000);
        tx.timestamp = now - Duration::minutes(i);
        txs.push(tx);
    }

    let perps = vec![PerpPosition {
        address: "0xwallet".into(),
        exchange: "gmx".into(),
        symbol: "ETH-USD".into(),
        side: "long".into(),
        size: Decimal::from(100),
        entry_price: Decimal::from(2_000),
        current_price: Decimal::from(2_000),
        unrealized_pnl: Decimal::ZERO,
        realized_pnl: Decimal::ZERO,
        margin: Decimal::from(10),
        leverage: Decimal::from(1_000),
        liquidation_price: Decimal::ZERO,
        timestamp: now,
        is_open: true,
    }];

    let profile = build_profile("0xwallet", &txs, &perps, &[], now);
    assert_eq!(profile.risk_score, Decimal::ONE_HUNDRED);
    assert_eq!(profile.activity_score, Decimal::ONE_HUNDRED);
    assert_eq!(profile.trading_pattern, TradingPattern::HighFrequency);

    let insights = generate_insights(&profile, &txs, &perps, &[]);
    assert!(insights.contains(&"High risk profile: heavy leverage or MEV strategies".to_string()));
    assert!(insights.contains(&"High leverage perpetual trader".to_string()));
}

#[test]
fn cex_hot_wallet_deposit_resolves_exchange_venue() {
    let raw = json!({
        "hash": "0xcex",
        "from": "0xwallet",
        "to": "0x3f5CE5FBFe3E9af3971dD833D26bA9b5C936f0bE",
        "value": "1000000000000000000",
        "timeStamp": "1700000000",
        "input": "0x"
    });

    let mut tx = normalize_record(&raw, RecordKind::Native, &eth_endpoint()).unwrap();
    mainnet_classifier().annotate(&mut tx);

    assert_eq!(tx.category, TxCategory::SpotBuy);
    assert_eq!(tx.venue, "binance");
}
