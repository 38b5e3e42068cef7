use futures_util::future::join_all;
use metrics::counter;
use std::sync::Arc;

use crate::analytics::{normalize_record, Classifier};
use crate::models::{RecordKind, Transaction};
use crate::providers::{ChainEndpoint, ExplorerClient, PriceResolver};

/// Fans one wallet address out across every configured chain and record kind,
/// normalizes, classifies, and prices what comes back.
///
/// A chain or record-kind fetch that fails is logged and contributes nothing;
/// it never aborts the other chains.
#[derive(Clone)]
pub struct TransactionAggregator {
    explorer: ExplorerClient,
    chains: Arc<Vec<ChainEndpoint>>,
    classifier: Arc<Classifier>,
    prices: Arc<PriceResolver>,
}

impl TransactionAggregator {
    pub fn new(
        explorer: ExplorerClient,
        chains: Vec<ChainEndpoint>,
        classifier: Arc<Classifier>,
        prices: Arc<PriceResolver>,
    ) -> Self {
        Self {
            explorer,
            chains: Arc::new(chains),
            classifier,
            prices,
        }
    }

    /// All transactions for `address` across every configured chain, sorted
    /// timestamp-descending.
    pub async fn fetch_all(&self, address: &str) -> Vec<Transaction> {
        let fetches = self
            .chains
            .iter()
            .map(|chain| async move { (chain.name.clone(), self.fetch_chain(chain, address).await) });

        let mut txs = merge_chain_results(join_all(fetches).await);
        txs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        txs
    }

    /// Fails only when every record kind fails, which reads as the chain
    /// being unreachable rather than quiet.
    async fn fetch_chain(
        &self,
        chain: &ChainEndpoint,
        address: &str,
    ) -> anyhow::Result<Vec<Transaction>> {
        let mut txs = Vec::new();
        let mut failed_kinds = 0;

        for kind in RecordKind::ALL {
            let records = match self
                .explorer
                .account_records(chain, address, kind.explorer_action())
                .await
            {
                Ok(records) => records,
                Err(e) => {
                    counter!("provider_errors_total", "provider" => chain.name.clone())
                        .increment(1);
                    tracing::warn!(
                        chain = %chain.name,
                        kind = %kind,
                        error = %e,
                        "Record fetch failed, continuing with remaining kinds"
                    );
                    failed_kinds += 1;
                    continue;
                }
            };

            for raw in &records {
                let Some(mut tx) = normalize_record(raw, kind, chain) else {
                    continue;
                };
                self.classifier.annotate(&mut tx);
                tx.price_usd = self.prices.price_at(&tx.token, tx.timestamp).await;
                txs.push(tx);
            }
        }

        if failed_kinds == RecordKind::ALL.len() {
            anyhow::bail!("all record kinds failed for chain {}", chain.name);
        }

        tracing::debug!(chain = %chain.name, count = txs.len(), "Chain fetch complete");
        Ok(txs)
    }
}

/// Flatten per-chain results, logging and dropping the failed ones.
pub(crate) fn merge_chain_results(
    results: Vec<(String, anyhow::Result<Vec<Transaction>>)>,
) -> Vec<Transaction> {
    let mut merged = Vec::new();

    for (chain, result) in results {
        match result {
            Ok(txs) => merged.extend(txs),
            Err(e) => {
                tracing::warn!(chain = %chain, error = %e, "Dropping failed chain result");
            }
        }
    }

    merged
}
