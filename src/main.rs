use std::env;
use std::sync::Arc;
use std::time::Duration;

use walletlens::analytics::{AddressBook, Classifier};
use walletlens::config::AppConfig;
use walletlens::db;
use walletlens::providers::{
    DydxClient, ExplorerClient, GraphClient, MuxClient, PriceResolver,
};
use walletlens::services::{
    LiquidityTracker, PerpTracker, TransactionAggregator, WalletAnalyzer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let addresses: Vec<String> = env::args().skip(1).collect();
    if addresses.is_empty() {
        anyhow::bail!("usage: walletlens <address> [address ...]");
    }

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .pool_max_idle_per_host(config.max_idle_per_host)
        .user_agent("walletlens/0.1")
        .build()?;

    let classifier = Arc::new(Classifier::new(AddressBook::mainnet_defaults()));
    let prices = Arc::new(PriceResolver::new(
        http.clone(),
        config.coingecko_keys.clone(),
        config.cmc_keys.clone(),
    ));

    let aggregator = TransactionAggregator::new(
        ExplorerClient::new(http.clone()),
        config.chains.clone(),
        classifier,
        prices,
    );
    let perp_tracker = PerpTracker::new(
        GraphClient::new(http.clone()),
        DydxClient::new(http.clone()),
        MuxClient::new(http.clone()),
    );
    let liquidity_tracker = LiquidityTracker::new(GraphClient::new(http));

    let analyzer = WalletAnalyzer::new(aggregator, perp_tracker, liquidity_tracker, pool);

    loop {
        for address in &addresses {
            match analyzer.analyze_wallet(address).await {
                Ok(summary) => println!("{summary}"),
                Err(e) => tracing::error!(wallet = %address, error = %e, "Analysis failed"),
            }
        }

        match config.watch_interval_secs {
            Some(secs) => {
                tracing::info!(interval_secs = secs, "Sleeping until next pass");
                tokio::time::sleep(Duration::from_secs(secs)).await;
            }
            None => break,
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
