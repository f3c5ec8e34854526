//! Yahoo Finance data providers.

pub mod quotes;
pub mod snapshot;

pub use quotes::{DailyQuote, YahooConfig, YahooQuoteProvider, quotes_to_series};
pub use snapshot::StockSnapshot;
