//! Turns one portfolio line item plus its fetched market data into an `EnrichedResult`.
//!
//! Enrichment never fails: fields that cannot be derived keep their defaults and
//! a note goes into `error`. Only the most recent note is kept, so a price-stage
//! note replaces a missing-cost-basis note.

use crate::fetcher::FetchOutcome;
use core_types::{CoreError, EnrichedResult, MarketSnapshot, PortfolioLineItem, PriceSource};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// The price an item is valued at, and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPrice {
    pub price: Decimal,
    pub previous_close: Decimal,
    pub source: PriceSource,
}

/// Picks the valuation price from a snapshot.
///
/// A quote without a previous close is not trusted on its own.
pub fn resolve_price(snapshot: &MarketSnapshot) -> Option<ResolvedPrice> {
    match (snapshot.current_price, snapshot.previous_close) {
        (Some(price), Some(previous_close)) => Some(ResolvedPrice {
            price,
            previous_close,
            source: PriceSource::Live,
        }),
        (None, Some(previous_close)) => Some(ResolvedPrice {
            price: previous_close,
            previous_close,
            source: PriceSource::PreviousClose,
        }),
        _ => None,
    }
}

/// Values one line item. `dayChange` and `dayChangePercent` are always 0.
pub fn enrich(symbol: &str, item: &PortfolioLineItem, outcome: Option<&FetchOutcome>) -> EnrichedResult {
    let mut result = EnrichedResult::from_line_item(symbol, item);

    match item.invested_amount() {
        Ok(Some(invested)) => {
            result.invested_amount = invested;
            result.avg_cost = item.ci.unwrap_or_default();
            debug!(symbol, invested = %invested, "Calculated invested amount.");
        }
        Ok(None) => {
            result.error = Some(format!(
                "Missing CI or Holdings for {}. Cannot calculate base values.",
                symbol
            ));
            debug!(symbol, "Missing CI or holdings; base values left at 0.");
        }
        Err(e) => note_overflow(&mut result, symbol, &e),
    }

    let Some(snapshot) = outcome.and_then(FetchOutcome::snapshot) else {
        let message = format!(
            "Could not retrieve any data for {} (symbol not found or API issue).",
            symbol
        );
        warn!(symbol, "{}", message);
        result.error = Some(message);
        return result;
    };

    let Some(resolved) = resolve_price(snapshot) else {
        let message = format!(
            "Could not retrieve any crucial live price data (currentPrice/previousClose) for {}.",
            symbol
        );
        warn!(symbol, "{}", message);
        result.error = Some(message);
        return result;
    };

    result.current_price = Some(resolved.price);
    result.previous_close = Some(resolved.previous_close);
    if resolved.source == PriceSource::PreviousClose {
        let message = format!(
            "Current price missing for {}. Using previousClose as currentPrice for calculations.",
            symbol
        );
        debug!(symbol, "{}", message);
        result.error = Some(message);
    }

    populate_market_fields(&mut result, snapshot, symbol);

    if let Some(holdings) = item.holdings {
        if result.invested_amount > Decimal::ZERO {
            match valuation(resolved.price, holdings, result.invested_amount) {
                Ok(valued) => {
                    result.current_value = valued.current_value;
                    result.gain_loss = valued.gain_loss;
                    result.return_percent = valued.return_percent;
                    debug!(
                        symbol,
                        current_value = %valued.current_value,
                        gain_loss = %valued.gain_loss,
                        return_percent = %valued.return_percent,
                        "Calculated valuation."
                    );
                }
                Err(e) => note_overflow(&mut result, symbol, &e),
            }
        }
    }

    result
}

fn populate_market_fields(result: &mut EnrichedResult, snapshot: &MarketSnapshot, symbol: &str) {
    result.market_cap = snapshot.market_cap;
    result.pe_ratio = snapshot.pe_ratio();
    if let Some(fraction) = snapshot.dividend_yield {
        match checked(fraction.checked_mul(Decimal::ONE_HUNDRED), "dividend yield") {
            Ok(percent) => result.dividend_yield = percent,
            Err(e) => note_overflow(result, symbol, &e),
        }
    }
    result.fifty_two_week_high = snapshot.fifty_two_week_high;
    result.fifty_two_week_low = snapshot.fifty_two_week_low;
    result.volume = snapshot.volume;
    result.average_volume = snapshot.preferred_average_volume();
    result.industry = snapshot.industry.clone();
}

struct Valuation {
    current_value: Decimal,
    gain_loss: Decimal,
    return_percent: Decimal,
}

fn valuation(price: Decimal, holdings: Decimal, invested: Decimal) -> Result<Valuation, CoreError> {
    let current_value = checked(price.checked_mul(holdings), "current value")?;
    let gain_loss = checked(current_value.checked_sub(invested), "gain/loss")?;
    let return_percent = percent_of(gain_loss, invested)?;
    Ok(Valuation {
        current_value,
        gain_loss,
        return_percent,
    })
}

fn note_overflow(result: &mut EnrichedResult, symbol: &str, error: &CoreError) {
    warn!(symbol, error = %error, "Calculation overflowed; affected values left at 0.");
    result.error = Some(format!("Could not calculate values for {}: {}.", symbol, error));
}

/// `part / whole × 100`, or exactly 0 when `whole` is 0.
fn percent_of(part: Decimal, whole: Decimal) -> Result<Decimal, CoreError> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let ratio = checked(part.checked_div(whole), "percentage")?;
    checked(ratio.checked_mul(Decimal::ONE_HUNDRED), "percentage")
}

fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal, CoreError> {
    value.ok_or_else(|| CoreError::Calculation(format!("{} out of range", what)))
}
