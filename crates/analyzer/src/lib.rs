use crate::error::AnalyzerError;
use api_client::MarketDataSource;
use core_types::EnrichedResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{Instrument, debug, info};
use uuid::Uuid;

pub mod enricher;
pub mod error;
pub mod fetcher;
pub mod validator;

pub use fetcher::FetchOutcome;

/// The success envelope returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    /// One entry per symbol. When several line items share a symbol the last one wins.
    pub stock_data: BTreeMap<String, EnrichedResult>,
}

/// The portfolio analysis pipeline: validate, fetch, enrich, assemble.
pub struct Analyzer {
    source: Arc<dyn MarketDataSource>,
    max_concurrent_fetches: usize,
}

impl Analyzer {
    pub fn new(source: Arc<dyn MarketDataSource>, max_concurrent_fetches: usize) -> Self {
        Self {
            source,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
        }
    }

    /// Runs the whole pipeline over one request payload.
    ///
    /// Fails only when the payload is unusable; per-symbol problems end up as
    /// notes inside the results.
    pub async fn run(&self, payload: &Value) -> Result<AnalysisResponse, AnalyzerError> {
        let span = tracing::info_span!(
            "analyze_portfolio",
            request_id = %Uuid::new_v4(),
            items = tracing::field::Empty,
        );
        self.analyze(payload).instrument(span).await
    }

    async fn analyze(&self, payload: &Value) -> Result<AnalysisResponse, AnalyzerError> {
        // 1. Validate
        let items = validator::validate_portfolio(payload)?;
        tracing::Span::current().record("items", items.len());
        info!("Received {} portfolio items.", items.len());

        let symbols = validator::unique_symbols(&items)?;
        info!(symbols = ?symbols, "Unique symbols to fetch.");

        // 2. Fetch
        let outcomes =
            fetcher::fetch_all(self.source.as_ref(), &symbols, self.max_concurrent_fetches).await;

        // 3. Enrich, in input order
        let mut stock_data = BTreeMap::new();
        for item in &items {
            let Some(symbol) = item.symbol.as_deref() else {
                continue;
            };
            let result = enricher::enrich(symbol, item, outcomes.get(symbol));
            if stock_data.insert(symbol.to_string(), result).is_some() {
                debug!(symbol, "Duplicate symbol; replacing the earlier result.");
            }
        }

        // 4. Assemble
        info!(results = stock_data.len(), "Portfolio analysis complete.");
        Ok(AnalysisResponse {
            success: true,
            stock_data,
        })
    }
}
