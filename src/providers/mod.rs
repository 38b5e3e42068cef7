pub mod explorer;
pub mod graph;
pub mod indexer;
pub mod price;

pub use explorer::{ChainEndpoint, ExplorerClient, ProviderKeys};
pub use graph::GraphClient;
pub use indexer::{DydxClient, MuxClient};
pub use price::PriceResolver;
