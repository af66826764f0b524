use crate::MarketDataSource;
use crate::auth::{Crumb, fetch_crumb};
use crate::error::ApiError;
use crate::responses::QuoteSummaryResponse;
use async_trait::async_trait;
use configuration::MarketDataConfig;
use core_types::MarketSnapshot;
use reqwest::{StatusCode, Url, header};
use tokio::sync::Mutex;

/// The quoteSummary modules that together cover every `MarketSnapshot` field.
const MODULES: &str = "price,financialData,summaryDetail,summaryProfile";

/// A `MarketDataSource` backed by the Yahoo Finance quoteSummary API.
pub struct YahooClient {
    client: reqwest::Client,
    base_url: Url,
    cookie_url: String,
    /// Auth handshake result, reused until the API rejects it.
    session: Mutex<Option<Crumb>>,
}

impl YahooClient {
    pub fn new(config: &MarketDataConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidData(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidData(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            cookie_url: config.cookie_url.clone(),
            session: Mutex::new(None),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidData("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn crumb(&self) -> Result<Crumb, ApiError> {
        let mut session = self.session.lock().await;
        if let Some(crumb) = session.as_ref() {
            return Ok(crumb.clone());
        }

        tracing::debug!("Requesting a new quote API crumb.");
        let crumb_url = self.endpoint(&["v1", "test", "getcrumb"])?;
        let crumb = fetch_crumb(&self.client, &self.cookie_url, crumb_url).await?;
        *session = Some(crumb.clone());
        Ok(crumb)
    }

    async fn clear_crumb(&self) {
        *self.session.lock().await = None;
    }
}

#[async_trait]
impl MarketDataSource for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, ApiError> {
        let crumb = self.crumb().await?;
        let url = self.endpoint(&["v10", "finance", "quoteSummary", symbol])?;

        let response = self
            .client
            .get(url)
            .header(header::COOKIE, &crumb.cookie)
            .query(&[("modules", MODULES), ("crumb", crumb.crumb.as_str())])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        self.settle(status, &text, symbol).await
    }
}

impl YahooClient {
    /// Interprets a quoteSummary reply, dropping the crumb when the API rejects it.
    async fn settle(&self, status: StatusCode, text: &str, symbol: &str) -> Result<MarketSnapshot, ApiError> {
        let outcome = parse_quote_summary(status, text, symbol);
        if let Err(ApiError::Auth(_)) = &outcome {
            // The next request performs a fresh handshake.
            self.clear_crumb().await;
        }
        outcome
    }
}

/// Maps the status and body of a quoteSummary reply to a snapshot or an error.
fn parse_quote_summary(status: StatusCode, text: &str, symbol: &str) -> Result<MarketSnapshot, ApiError> {
    match status {
        StatusCode::NOT_FOUND => return Err(ApiError::SymbolNotFound(symbol.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            return Err(ApiError::Auth(format!("quote API rejected the crumb ({})", status)));
        }
        s if !s.is_success() => {
            return Err(ApiError::ApiError(format!("{} for {}: {}", status, symbol, text)));
        }
        _ => {}
    }

    let body: QuoteSummaryResponse = serde_json::from_str(text)
        .map_err(|e| ApiError::Deserialization(format!("{}. Original text: {}", e, text)))?;

    if let Some(error) = body.quote_summary.error {
        return Err(ApiError::ApiError(format!("{}: {}", error.code, error.description)));
    }

    body.quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .map(|result| result.into_snapshot())
        .ok_or_else(|| ApiError::SymbolNotFound(symbol.to_string()))
}
