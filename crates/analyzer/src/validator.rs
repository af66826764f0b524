use crate::error::AnalyzerError;
use core_types::PortfolioLineItem;
use serde_json::Value;
use std::collections::HashSet;

/// Checks the request payload and parses its `portfolio` list.
///
/// The list must exist, be an array and hold at least one entry. Each entry
/// must be an object; odd field values inside it are left for enrichment to judge.
pub fn validate_portfolio(payload: &Value) -> Result<Vec<PortfolioLineItem>, AnalyzerError> {
    let portfolio = payload
        .get("portfolio")
        .filter(|p| !p.is_null())
        .ok_or(AnalyzerError::MissingPortfolio)?;
    let entries = portfolio
        .as_array()
        .ok_or(AnalyzerError::PortfolioNotSequence)?;
    if entries.is_empty() {
        return Err(AnalyzerError::EmptyPortfolio);
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            PortfolioLineItem::from_json(entry).map_err(|e| AnalyzerError::InvalidLineItem {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Distinct symbols across the line items, in order of first appearance.
///
/// Items without a symbol contribute nothing. An empty result is an error:
/// there would be nothing to fetch.
pub fn unique_symbols(items: &[PortfolioLineItem]) -> Result<Vec<String>, AnalyzerError> {
    let mut seen = HashSet::new();
    let symbols: Vec<String> = items
        .iter()
        .filter_map(|item| item.symbol.as_deref())
        .filter(|symbol| seen.insert(*symbol))
        .map(str::to_string)
        .collect();

    if symbols.is_empty() {
        return Err(AnalyzerError::NoSymbols);
    }
    Ok(symbols)
}
