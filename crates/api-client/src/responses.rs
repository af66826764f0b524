use core_types::MarketSnapshot;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// The envelope of a `GET /v10/finance/quoteSummary/{symbol}` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummary {
    /// `null` when the symbol is unknown.
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<QuoteSummaryError>,
}

/// Represents an error body from the quote API.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryError {
    pub code: String,
    pub description: String,
}

/// One result, holding the modules we asked for.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    pub price: Option<PriceModule>,
    pub financial_data: Option<FinancialDataModule>,
    pub summary_detail: Option<SummaryDetailModule>,
    pub summary_profile: Option<SummaryProfileModule>,
}

/// A numeric field. Yahoo sends `{"raw": 1.5, "fmt": "1.50"}`, or `{}` when there is no value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawValue {
    pub raw: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub regular_market_price: Option<RawValue>,
    pub regular_market_previous_close: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDataModule {
    pub current_price: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetailModule {
    pub previous_close: Option<RawValue>,
    pub market_cap: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<RawValue>,
    pub dividend_yield: Option<RawValue>,
    pub fifty_two_week_high: Option<RawValue>,
    pub fifty_two_week_low: Option<RawValue>,
    pub volume: Option<RawValue>,
    pub average_volume: Option<RawValue>,
    #[serde(rename = "averageVolume10days")]
    pub average_volume_10_days: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryProfileModule {
    pub industry: Option<String>,
}

impl QuoteSummaryResult {
    /// Collapses the raw modules into a typed snapshot.
    ///
    /// `financialData.currentPrice` is preferred; funds and ETFs lack that module,
    /// so the `price` module fills in. Non-finite numbers are dropped here.
    pub fn into_snapshot(self) -> MarketSnapshot {
        let price = self.price.unwrap_or_default();
        let financial = self.financial_data.unwrap_or_default();
        let detail = self.summary_detail.unwrap_or_default();

        MarketSnapshot {
            current_price: decimal(&financial.current_price)
                .or_else(|| decimal(&price.regular_market_price)),
            previous_close: decimal(&detail.previous_close)
                .or_else(|| decimal(&price.regular_market_previous_close)),
            market_cap: whole(&detail.market_cap),
            trailing_pe: decimal(&detail.trailing_pe),
            forward_pe: decimal(&detail.forward_pe),
            dividend_yield: decimal(&detail.dividend_yield),
            fifty_two_week_high: decimal(&detail.fifty_two_week_high),
            fifty_two_week_low: decimal(&detail.fifty_two_week_low),
            volume: whole(&detail.volume),
            average_volume_10_days: whole(&detail.average_volume_10_days),
            average_volume: whole(&detail.average_volume),
            industry: self
                .summary_profile
                .and_then(|p| p.industry)
                .filter(|i| !i.trim().is_empty()),
        }
    }
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw).filter(|v| v.is_finite())
}

// Going through the shortest round-trip string keeps 0.1 as 0.1 instead of its binary expansion.
fn decimal(value: &Option<RawValue>) -> Option<Decimal> {
    raw(value).and_then(|v| Decimal::from_str(&v.to_string()).ok())
}

fn whole(value: &Option<RawValue>) -> Option<u64> {
    raw(value).filter(|v| *v >= 0.0).map(|v| v.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const AAPL: &str = r#"{
        "quoteSummary": {
            "result": [{
                "price": {
                    "regularMarketPrice": {"raw": 189.5, "fmt": "189.50"},
                    "regularMarketPreviousClose": {"raw": 187.0, "fmt": "187.00"}
                },
                "financialData": {
                    "currentPrice": {"raw": 189.84, "fmt": "189.84"}
                },
                "summaryDetail": {
                    "previousClose": {"raw": 187.15, "fmt": "187.15"},
                    "marketCap": {"raw": 2950000000000, "fmt": "2.95T"},
                    "trailingPE": {"raw": 29.4, "fmt": "29.40"},
                    "forwardPE": {"raw": 26.1, "fmt": "26.10"},
                    "dividendYield": {"raw": 0.0051, "fmt": "0.51%"},
                    "fiftyTwoWeekHigh": {"raw": 199.62, "fmt": "199.62"},
                    "fiftyTwoWeekLow": {"raw": 164.08, "fmt": "164.08"},
                    "volume": {"raw": 48123400, "fmt": "48.12M"},
                    "averageVolume": {"raw": 55012000, "fmt": "55.01M"},
                    "averageVolume10days": {"raw": 51003000, "fmt": "51M"}
                },
                "summaryProfile": {"industry": "Consumer Electronics", "sector": "Technology"}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn full_response_maps_every_field() {
        let response: QuoteSummaryResponse = serde_json::from_str(AAPL).unwrap();
        let result = response.quote_summary.result.unwrap().into_iter().next().unwrap();
        let snapshot = result.into_snapshot();

        assert_eq!(snapshot.current_price, Some(dec!(189.84)));
        assert_eq!(snapshot.previous_close, Some(dec!(187.15)));
        assert_eq!(snapshot.market_cap, Some(2_950_000_000_000));
        assert_eq!(snapshot.trailing_pe, Some(dec!(29.4)));
        assert_eq!(snapshot.forward_pe, Some(dec!(26.1)));
        assert_eq!(snapshot.dividend_yield, Some(dec!(0.0051)));
        assert_eq!(snapshot.fifty_two_week_high, Some(dec!(199.62)));
        assert_eq!(snapshot.fifty_two_week_low, Some(dec!(164.08)));
        assert_eq!(snapshot.volume, Some(48_123_400));
        assert_eq!(snapshot.average_volume_10_days, Some(51_003_000));
        assert_eq!(snapshot.average_volume, Some(55_012_000));
        assert_eq!(snapshot.industry.as_deref(), Some("Consumer Electronics"));
    }

    #[test]
    fn price_module_fills_in_for_funds() {
        let json = r#"{
            "price": {
                "regularMarketPrice": {"raw": 431.2},
                "regularMarketPreviousClose": {"raw": 430.0}
            },
            "summaryDetail": {"dividendYield": {}}
        }"#;
        let result: QuoteSummaryResult = serde_json::from_str(json).unwrap();
        let snapshot = result.into_snapshot();

        assert_eq!(snapshot.current_price, Some(dec!(431.2)));
        assert_eq!(snapshot.previous_close, Some(dec!(430)));
        assert_eq!(snapshot.dividend_yield, None);
        assert_eq!(snapshot.industry, None);
    }

    #[test]
    fn empty_objects_and_missing_modules_become_none() {
        let json = r#"{"summaryDetail": {"previousClose": {}, "volume": {"raw": null}}}"#;
        let result: QuoteSummaryResult = serde_json::from_str(json).unwrap();
        let snapshot = result.into_snapshot();
        assert_eq!(snapshot, MarketSnapshot::default());
    }

    #[test]
    fn not_found_body_parses() {
        let json = r#"{
            "quoteSummary": {
                "result": null,
                "error": {"code": "Not Found", "description": "Quote not found for symbol: ZZZZ"}
            }
        }"#;
        let response: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        assert!(response.quote_summary.result.is_none());
        assert_eq!(response.quote_summary.error.unwrap().code, "Not Found");
    }

    #[test]
    fn negative_volumes_are_discarded() {
        let value = Some(RawValue { raw: Some(-5.0) });
        assert_eq!(whole(&value), None);
        let value = Some(RawValue { raw: Some(f64::NAN) });
        assert_eq!(decimal(&value), None);
    }
}
