pub mod position;
pub mod profile;
pub mod transaction;

pub use position::{LiquidityPosition, PerpPosition};
pub use profile::{TradingPattern, WalletProfile, WalletSummary};
pub use transaction::{Transaction, TxCategory};

use std::fmt;

// ---------------------------------------------------------------------------
// RecordKind — which explorer endpoint a raw record came from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Normal (external) transaction.
    Native,
    /// Internal call produced by contract execution.
    Internal,
    /// ERC-20 token transfer.
    Token,
    /// ERC-721 transfer.
    Nft,
}

impl RecordKind {
    /// The etherscan-family `action` parameter for this record kind.
    pub fn explorer_action(&self) -> &'static str {
        match self {
            RecordKind::Native => "txlist",
            RecordKind::Internal => "txlistinternal",
            RecordKind::Token => "tokentx",
            RecordKind::Nft => "tokennfttx",
        }
    }

    pub const ALL: [RecordKind; 4] = [
        RecordKind::Native,
        RecordKind::Internal,
        RecordKind::Token,
        RecordKind::Nft,
    ];
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.explorer_action())
    }
}
