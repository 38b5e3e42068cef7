use thiserror::Error;

/// Errors surfaced by a top-level `analyze_wallet` call.
///
/// Per-provider failures never reach this level — they are recovered at the
/// adapter boundary as empty results. Only a failed join of the concurrent
/// aggregation tasks or a failed write to the store aborts a pass.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A concurrent aggregation subtask failed to join (panic or cancellation).
    /// A profile computed from an incomplete join would silently misrepresent
    /// the wallet, so the whole pass fails instead.
    #[error("aggregation failed: {0}")]
    Aggregation(String),

    /// Writing results to the durable store failed. The summary had already
    /// been computed in memory at this point; the pass can simply be re-run.
    #[error("persistence failed: {0}")]
    Persistence(#[from] anyhow::Error),
}
