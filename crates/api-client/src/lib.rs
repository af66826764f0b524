use crate::error::ApiError;
use async_trait::async_trait;
use core_types::MarketSnapshot;

mod auth;
pub mod error;
pub mod in_memory;
pub mod responses;
pub mod yahoo;
// --- Public API ---
pub use in_memory::InMemorySource;
pub use yahoo::YahooClient;

/// The abstract interface for a market-data source.
/// This trait is the contract the analyzer uses, allowing the underlying
/// implementation (Yahoo or an in-memory map) to be swapped out.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Short identifier used in log lines.
    fn name(&self) -> &'static str;

    /// Fetches the current snapshot for one ticker symbol.
    ///
    /// Any error means no data is available for this symbol; callers decide
    /// whether that is fatal.
    async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, ApiError>;
}
