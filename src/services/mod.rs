pub mod analyzer;
pub mod liquidity_tracker;
pub mod perp_tracker;
pub mod transaction_aggregator;

pub use analyzer::WalletAnalyzer;
pub use liquidity_tracker::LiquidityTracker;
pub use perp_tracker::PerpTracker;
pub use transaction_aggregator::TransactionAggregator;
