use crate::MarketDataSource;
use crate::error::ApiError;
use async_trait::async_trait;
use core_types::MarketSnapshot;
use std::collections::HashMap;
use std::sync::Mutex;

/// A `MarketDataSource` that answers from a fixed symbol → snapshot map.
///
/// Used for offline runs (`analyze --snapshots`) and in tests. Symbols that are
/// not in the map fail with `SymbolNotFound`, like an unknown ticker would.
#[derive(Debug, Default)]
pub struct InMemorySource {
    snapshots: HashMap<String, MarketSnapshot>,
    requests: Mutex<Vec<String>>,
}

impl InMemorySource {
    pub fn new(snapshots: HashMap<String, MarketSnapshot>) -> Self {
        Self {
            snapshots,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_snapshot(mut self, symbol: &str, snapshot: MarketSnapshot) -> Self {
        self.snapshots.insert(symbol.to_string(), snapshot);
        self
    }

    /// Every symbol requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MarketDataSource for InMemorySource {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, ApiError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(symbol.to_string());
        }
        self.snapshots
            .get(symbol)
            .cloned()
            .ok_or_else(|| ApiError::SymbolNotFound(symbol.to_string()))
    }
}
