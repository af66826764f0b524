use analyzer::Analyzer;
use api_client::{error::ApiError, InMemorySource, MarketDataSource};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use configuration::ServerConfig;
use core_types::MarketSnapshot;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use web_server::{app_router, AppState};

fn app(source: Arc<dyn MarketDataSource>) -> Router {
    let state = Arc::new(AppState {
        analyzer: Analyzer::new(source, 1),
    });
    app_router(state, &ServerConfig::default())
}

fn market() -> Arc<dyn MarketDataSource> {
    Arc::new(
        InMemorySource::default()
            .with_snapshot(
                "AAPL",
                MarketSnapshot {
                    current_price: Some(dec!(12)),
                    previous_close: Some(dec!(11)),
                    market_cap: Some(2_900_000_000_000),
                    trailing_pe: Some(dec!(29.5)),
                    industry: Some("Consumer Electronics".to_string()),
                    ..Default::default()
                },
            )
            .with_snapshot(
                "KO",
                MarketSnapshot {
                    previous_close: Some(dec!(9.5)),
                    dividend_yield: Some(dec!(0.03)),
                    ..Default::default()
                },
            ),
    )
}

async fn post(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze-portfolio")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_endpoint_answers() {
    let response = app(market())
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn values_a_live_position() {
    let body = json!({"portfolio": [{
        "symbol": "AAPL", "bolsa": "NASDAQ", "CI": 10, "holdings": 5,
        "Category": "Growth", "Sector": "Technology"
    }]});
    let (status, json) = post(app(market()), body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let aapl = &json["stockData"]["AAPL"];
    assert_eq!(aapl["symbol"], "AAPL");
    assert_eq!(aapl["bolsa"], "NASDAQ");
    assert_eq!(aapl["category"], "Growth");
    assert_eq!(aapl["sector"], "Technology");
    assert_eq!(aapl["invested_amount"].as_f64(), Some(50.0));
    assert_eq!(aapl["avgCost"].as_f64(), Some(10.0));
    assert_eq!(aapl["currentPrice"].as_f64(), Some(12.0));
    assert_eq!(aapl["previousClose"].as_f64(), Some(11.0));
    assert_eq!(aapl["dayChange"].as_f64(), Some(0.0));
    assert_eq!(aapl["dayChangePercent"].as_f64(), Some(0.0));
    assert_eq!(aapl["currentValue"].as_f64(), Some(60.0));
    assert_eq!(aapl["gainLoss"].as_f64(), Some(10.0));
    assert_eq!(aapl["returnPercent"].as_f64(), Some(20.0));
    assert_eq!(aapl["dividendYield"].as_f64(), Some(0.0));
    assert_eq!(aapl["peRatio"].as_f64(), Some(29.5));
    assert_eq!(aapl["marketCap"].as_u64(), Some(2_900_000_000_000));
    assert_eq!(aapl["yfinance_industry"], "Consumer Electronics");
    assert!(aapl["error"].is_null());
}

#[tokio::test]
async fn one_entry_per_distinct_symbol() {
    let body = json!({"portfolio": [
        {"symbol": "AAPL", "CI": 10, "holdings": 5},
        {"symbol": "KO", "CI": 9, "holdings": 2},
        {"symbol": "AAPL", "CI": 11, "holdings": 1},
        {"CI": 1, "holdings": 1}
    ]});
    let (status, json) = post(app(market()), body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let stock_data = json["stockData"].as_object().unwrap();
    assert_eq!(stock_data.len(), 2);
    assert_eq!(stock_data["AAPL"]["CI"].as_f64(), Some(11.0));
}

#[tokio::test]
async fn previous_close_stands_in_for_current_price() {
    let body = json!({"portfolio": [{"symbol": "KO", "CI": 10, "holdings": 4}]});
    let (status, json) = post(app(market()), body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let ko = &json["stockData"]["KO"];
    assert_eq!(ko["currentPrice"].as_f64(), Some(9.5));
    assert_eq!(ko["dayChange"].as_f64(), Some(0.0));
    assert_eq!(ko["dayChangePercent"].as_f64(), Some(0.0));
    assert_eq!(ko["dividendYield"].as_f64(), Some(3.0));
    assert!(ko["error"].as_str().unwrap().contains("previousClose"));
}

#[tokio::test]
async fn unknown_symbol_still_returns_cost_basis() {
    let body = json!({"portfolio": [{"symbol": "ZZZZ", "CI": 10, "holdings": 5}]});
    let (status, json) = post(app(market()), body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let entry = &json["stockData"]["ZZZZ"];
    assert_eq!(entry["invested_amount"].as_f64(), Some(50.0));
    assert_eq!(entry["avgCost"].as_f64(), Some(10.0));
    assert!(entry["currentPrice"].is_null());
    assert!(entry["previousClose"].is_null());
    assert_eq!(entry["currentValue"].as_f64(), Some(0.0));
    assert_eq!(entry["gainLoss"].as_f64(), Some(0.0));
    assert_eq!(entry["returnPercent"].as_f64(), Some(0.0));
    assert!(entry["error"].is_string());
}

#[tokio::test]
async fn malformed_requests_are_rejected_with_400() {
    for body in [
        json!({"portfolio": []}).to_string(),
        json!({"portfolio": "AAPL"}).to_string(),
        json!({"portfolio": {"symbol": "AAPL"}}).to_string(),
        json!({"something": "else"}).to_string(),
        json!({"portfolio": [{"CI": 10, "holdings": 5}, {"bolsa": "NYSE"}]}).to_string(),
        json!({"portfolio": [{"symbol": "AAPL"}, "KO"]}).to_string(),
        "{not json".to_string(),
        String::new(),
    ] {
        let (status, json) = post(app(market()), body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert!(json["error"].is_string(), "body: {body}");
    }
}

#[tokio::test]
async fn no_symbols_message() {
    let body = json!({"portfolio": [{"CI": 10}]});
    let (status, json) = post(app(market()), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No valid symbols found in portfolio to fetch");
}

#[tokio::test]
async fn overflowing_item_does_not_sink_the_batch() {
    let body = json!({"portfolio": [
        {"symbol": "AAPL", "CI": 10, "holdings": 5},
        {"symbol": "KO", "CI": 5e28, "holdings": 2}
    ]});
    let (status, json) = post(app(market()), body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stockData"]["AAPL"]["currentValue"].as_f64(), Some(60.0));
    assert!(json["stockData"]["AAPL"]["error"].is_null());
    let ko = &json["stockData"]["KO"];
    assert_eq!(ko["invested_amount"].as_f64(), Some(0.0));
    assert_eq!(ko["currentPrice"].as_f64(), Some(9.5));
    assert!(ko["error"].is_string());
}

#[tokio::test]
async fn odd_field_values_stay_on_their_own_item() {
    let body = json!({"portfolio": [
        {"symbol": "AAPL", "CI": 10, "holdings": 5},
        {"symbol": "KO", "bolsa": 5, "CI": 1e29, "holdings": 2}
    ]});
    let (status, json) = post(app(market()), body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stockData"]["AAPL"]["returnPercent"].as_f64(), Some(20.0));
    let ko = &json["stockData"]["KO"];
    assert_eq!(ko["bolsa"], "5");
    assert!(ko["CI"].is_null());
    assert_eq!(ko["invested_amount"].as_f64(), Some(0.0));
}

struct PanickingSource;

#[async_trait]
impl MarketDataSource for PanickingSource {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn fetch_snapshot(&self, _symbol: &str) -> Result<MarketSnapshot, ApiError> {
        panic!("quote decoder exploded");
    }
}

#[tokio::test]
async fn panics_become_internal_server_errors() {
    let body = json!({"portfolio": [{"symbol": "AAPL", "CI": 10, "holdings": 5}]});
    let (status, json) = post(app(Arc::new(PanickingSource)), body.to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal server error: quote decoder exploded");
}

#[tokio::test]
async fn any_origin_may_call_the_api() {
    let response = app(market())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze-portfolio")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"portfolio": [{"symbol": "AAPL"}]}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
