use api_client::MarketDataSource;
use core_types::MarketSnapshot;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// What the fetch stage learned about one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(MarketSnapshot),
    /// No data could be obtained. Holds the reason, for logs only.
    Failed(String),
}

impl FetchOutcome {
    pub fn snapshot(&self) -> Option<&MarketSnapshot> {
        match self {
            FetchOutcome::Fetched(snapshot) => Some(snapshot),
            FetchOutcome::Failed(_) => None,
        }
    }
}

/// Fetches a snapshot for every symbol, once each.
///
/// A failing symbol is recorded as `Failed` and never stops the others. At most
/// `max_concurrent` requests are in flight; with 1 they run one after another.
pub async fn fetch_all(
    source: &dyn MarketDataSource,
    symbols: &[String],
    max_concurrent: usize,
) -> HashMap<String, FetchOutcome> {
    stream::iter(symbols.iter().cloned())
        .map(|symbol: String| async move {
            let symbol = &symbol;
            debug!(symbol = %symbol, source = source.name(), "Fetching market data.");
            let outcome = match source.fetch_snapshot(symbol).await {
                Ok(snapshot) => {
                    info!(
                        symbol = %symbol,
                        current_price = ?snapshot.current_price,
                        previous_close = ?snapshot.previous_close,
                        "Fetched market data."
                    );
                    FetchOutcome::Fetched(snapshot)
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Failed to fetch market data.");
                    FetchOutcome::Failed(e.to_string())
                }
            };
            (symbol.clone(), outcome)
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect::<HashMap<_, _>>()
        .await
}
