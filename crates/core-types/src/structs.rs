use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::str::FromStr;

/// Placeholder used for passthrough text fields the caller left out.
pub const NOT_AVAILABLE: &str = "N/A";

/// One row of the caller's portfolio, as sent in the request body.
///
/// Field names follow the wire format the browser client sends, which is why
/// `CI`, `Category` and `Sector` are capitalized. Reading is lenient: text
/// fields accept any scalar, and a number that does not fit a `Decimal`
/// counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioLineItem {
    #[serde(default, deserialize_with = "lenient_text")]
    pub symbol: Option<String>,
    /// Market or exchange identifier. Opaque to us.
    #[serde(default, deserialize_with = "lenient_text")]
    pub bolsa: Option<String>,
    /// Cost per unit held.
    #[serde(rename = "CI", default, deserialize_with = "lenient_decimal")]
    pub ci: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub holdings: Option<Decimal>,
    #[serde(rename = "Category", default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(rename = "Sector", default, deserialize_with = "lenient_text")]
    pub sector: Option<String>,
}

impl PortfolioLineItem {
    /// Parses a single line item out of an untyped JSON value.
    ///
    /// The value must be an object; unknown keys are ignored.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        if !value.is_object() {
            return Err(CoreError::InvalidInput(
                "portfolio item".to_string(),
                "expected an object".to_string(),
            ));
        }
        Self::deserialize(value)
            .map_err(|e| CoreError::InvalidInput("portfolio item".to_string(), e.to_string()))
    }

    /// Returns `CI × holdings` when both are present.
    pub fn invested_amount(&self) -> Result<Option<Decimal>, CoreError> {
        match (self.ci, self.holdings) {
            (Some(ci), Some(holdings)) => ci
                .checked_mul(holdings)
                .map(Some)
                .ok_or_else(|| CoreError::Calculation(format!("CI × holdings overflowed ({ci} × {holdings})"))),
            _ => Ok(None),
        }
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

fn lenient_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number_to_decimal(&number),
        Value::String(text) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    })
}

fn number_to_decimal(number: &Number) -> Option<Decimal> {
    if let Some(whole) = number.as_i64() {
        return Some(Decimal::from(whole));
    }
    if let Some(whole) = number.as_u64() {
        return Some(Decimal::from(whole));
    }
    // The shortest round-trip form keeps 10.37 as 10.37 rather than its binary expansion.
    number
        .as_f64()
        .filter(|f| f.is_finite())
        .and_then(|f| Decimal::from_str(&f.to_string()).ok())
}

/// The market data known about one symbol at fetch time.
///
/// Every field is optional: the upstream source routinely omits some of them,
/// and the enrichment rules decide what an absent field means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketSnapshot {
    pub current_price: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    pub market_cap: Option<u64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<Decimal>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<Decimal>,
    /// Expressed as a fraction (0.005 is half a percent).
    pub dividend_yield: Option<Decimal>,
    pub fifty_two_week_high: Option<Decimal>,
    pub fifty_two_week_low: Option<Decimal>,
    pub volume: Option<u64>,
    #[serde(rename = "averageVolume10Days")]
    pub average_volume_10_days: Option<u64>,
    pub average_volume: Option<u64>,
    pub industry: Option<String>,
}

impl MarketSnapshot {
    /// Trailing P/E, falling back to forward P/E. A zero trailing value counts as missing.
    pub fn pe_ratio(&self) -> Option<Decimal> {
        self.trailing_pe.filter(|pe| !pe.is_zero()).or(self.forward_pe)
    }

    /// Ten-day average volume, falling back to the long-run average. Zero counts as missing.
    pub fn preferred_average_volume(&self) -> Option<u64> {
        self.average_volume_10_days.filter(|v| *v != 0).or(self.average_volume)
    }
}

/// The valuation record produced for one portfolio line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedResult {
    pub symbol: String,
    pub bolsa: String,
    #[serde(rename = "CI")]
    pub ci: Option<Decimal>,
    pub holdings: Option<Decimal>,
    #[serde(rename = "invested_amount")]
    pub invested_amount: Decimal,
    pub current_price: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    pub day_change: Decimal,
    pub day_change_percent: Decimal,
    pub market_cap: Option<u64>,
    pub pe_ratio: Option<Decimal>,
    /// Percent, not a fraction.
    pub dividend_yield: Decimal,
    pub fifty_two_week_high: Option<Decimal>,
    pub fifty_two_week_low: Option<Decimal>,
    pub volume: Option<u64>,
    pub average_volume: Option<u64>,
    pub sector: String,
    pub category: String,
    #[serde(rename = "yfinance_industry")]
    pub industry: Option<String>,
    pub current_value: Decimal,
    pub gain_loss: Decimal,
    pub return_percent: Decimal,
    pub avg_cost: Decimal,
    /// Human-readable note about why some fields could not be derived.
    pub error: Option<String>,
}

impl EnrichedResult {
    /// A record that echoes the caller's fields with every derived value at its default.
    pub fn from_line_item(symbol: &str, item: &PortfolioLineItem) -> Self {
        Self {
            symbol: symbol.to_string(),
            bolsa: item.bolsa.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ci: item.ci,
            holdings: item.holdings,
            invested_amount: Decimal::ZERO,
            current_price: None,
            previous_close: None,
            day_change: Decimal::ZERO,
            day_change_percent: Decimal::ZERO,
            market_cap: None,
            pe_ratio: None,
            dividend_yield: Decimal::ZERO,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
            volume: None,
            average_volume: None,
            sector: item.sector.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            category: item.category.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            industry: None,
            current_value: Decimal::ZERO,
            gain_loss: Decimal::ZERO,
            return_percent: Decimal::ZERO,
            avg_cost: Decimal::ZERO,
            error: None,
        }
    }
}
