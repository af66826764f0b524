/// Where the price used for valuation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// Both `currentPrice` and `previousClose` were quoted.
    Live,
    /// `currentPrice` was missing and `previousClose` stands in for it.
    PreviousClose,
}
