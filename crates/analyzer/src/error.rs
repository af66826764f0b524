use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid or empty portfolio data provided: the 'portfolio' field is missing")]
    MissingPortfolio,

    #[error("Invalid or empty portfolio data provided: 'portfolio' must be a list")]
    PortfolioNotSequence,

    #[error("Invalid or empty portfolio data provided: 'portfolio' is empty")]
    EmptyPortfolio,

    #[error("Invalid portfolio item at index {index}: {reason}")]
    InvalidLineItem { index: usize, reason: String },

    #[error("No valid symbols found in portfolio to fetch")]
    NoSymbols,
}
