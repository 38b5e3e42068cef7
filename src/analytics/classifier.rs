use rust_decimal::Decimal;

use super::address_book::AddressBook;
use crate::models::{Transaction, TxCategory};

/// Call selector of `swapExactETHForTokens` — treated as a buy.
const BUY_SELECTOR: &str = "0x7ff36ab5";
/// Call selector of `swapExactTokensForETH` — treated as a sell.
const SELL_SELECTOR: &str = "0x18cbafe5";

/// Known swap-function markers. More than one distinct marker in a single
/// payload is evidence of a multi-hop atomic swap.
const SWAP_MARKERS: [&str; 3] = [
    "swapExactTokensForTokens",
    "swapTokensForExactTokens",
    "swapExactETHForTokens",
];

const FLASH_LOAN_MARKER: &str = "flashloan";
const ADD_LIQUIDITY_MARKER: &str = "addLiquidity";
const REMOVE_LIQUIDITY_MARKER: &str = "removeLiquidity";

/// Rule-based transaction classifier.
///
/// Classification is a deterministic pure function of (destination address,
/// call payload, amount sign) plus the injected address tables — it never
/// depends on other transactions.
#[derive(Debug, Clone)]
pub struct Classifier {
    book: AddressBook,
}

impl Classifier {
    pub fn new(book: AddressBook) -> Self {
        Self { book }
    }

    /// MEV gas-fee threshold in native-currency units.
    fn mev_gas_threshold() -> Decimal {
        Decimal::new(1, 1) // 0.1
    }

    /// Ordered rule cascade, first match wins. Venue-specific rules must
    /// precede the sign-of-amount fallback or every transfer would collapse
    /// into SpotBuy/SpotSell.
    pub fn classify(&self, to: &str, input: &str, amount: Decimal) -> TxCategory {
        if self.book.dex_venue(to).is_some() {
            if input.starts_with(BUY_SELECTOR) {
                return TxCategory::SpotBuy;
            }
            if input.starts_with(SELL_SELECTOR) {
                return TxCategory::SpotSell;
            }
            return Self::spot_by_sign(amount);
        }

        if self.book.cex_venue(to).is_some() {
            return TxCategory::SpotBuy;
        }

        if self.book.perp_venue(to).is_some() {
            return TxCategory::PerpOpen;
        }

        if self.book.lending_venue(to).is_some() {
            return TxCategory::Lending;
        }

        if input.contains(ADD_LIQUIDITY_MARKER) {
            return TxCategory::LiquidityAdd;
        }
        if input.contains(REMOVE_LIQUIDITY_MARKER) {
            return TxCategory::LiquidityRemove;
        }

        Self::spot_by_sign(amount)
    }

    fn spot_by_sign(amount: Decimal) -> TxCategory {
        if amount > Decimal::ZERO {
            TxCategory::SpotBuy
        } else {
            TxCategory::SpotSell
        }
    }

    /// More than one distinct known swap selector in one payload.
    pub fn arbitrage_suspected(&self, input: &str) -> bool {
        SWAP_MARKERS.iter().filter(|m| input.contains(**m)).count() > 1
    }

    /// MEV is monotone in arbitrage: an arbitrage-flagged transaction is
    /// always MEV-flagged.
    pub fn mev_suspected(&self, gas_fee: Decimal, arbitrage: bool, input: &str) -> bool {
        gas_fee > Self::mev_gas_threshold()
            || arbitrage
            || input.to_lowercase().contains(FLASH_LOAN_MARKER)
    }

    /// Resolve the destination address to a venue name. Hot-wallet lists are
    /// operator-curated and more specific, so they take precedence over DEX
    /// router tables.
    pub fn resolve_venue(&self, to: &str) -> String {
        if let Some(venue) = self.book.cex_venue(to) {
            return venue.to_string();
        }
        if let Some(venue) = self.book.dex_venue(to) {
            return venue.to_string();
        }
        "unknown".to_string()
    }

    /// Apply category, flags, and venue to a normalized transaction in place.
    pub fn annotate(&self, tx: &mut Transaction) {
        let input = tx
            .raw
            .get("input")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        tx.category = self.classify(&tx.to_address, &input, tx.amount);
        tx.arbitrage_suspected = self.arbitrage_suspected(&input);
        tx.mev_suspected = self.mev_suspected(tx.gas_fee, tx.arbitrage_suspected, &input);
        tx.venue = self.resolve_venue(&tx.to_address);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
