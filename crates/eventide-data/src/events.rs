//! Catalog of dated corporate events.
//!
//! Loaded from a CSV with the columns
//! `ticker,industry,event_date,headline,news_type,sentiment`.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Tone of an event headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Sentiment {
    /// Good news
    Positive,
    /// Bad news
    Negative,
    /// Neither, or not classified
    #[default]
    Neutral,
}

impl From<String> for Sentiment {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        })
    }
}

/// One catalogued event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Ticker the event concerns
    pub ticker: String,
    /// Industry of the company
    #[serde(default)]
    pub industry: String,
    /// Calendar date of the event
    #[serde(deserialize_with = "deserialize_event_date")]
    pub event_date: NaiveDate,
    /// News headline
    #[serde(default)]
    pub headline: String,
    /// Category, e.g. earnings or M&A
    #[serde(default)]
    pub news_type: String,
    /// Headline tone
    #[serde(default)]
    pub sentiment: Sentiment,
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn deserialize_event_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// Events grouped for industry, ticker and date selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCatalog {
    events: Vec<EventRecord>,
}

impl EventCatalog {
    /// Build a catalog; tickers are upper-cased and industries trimmed.
    pub fn new(events: Vec<EventRecord>) -> Self {
        let mut events: Vec<EventRecord> = events
            .into_iter()
            .map(|mut e| {
                e.ticker = e.ticker.trim().to_ascii_uppercase();
                e.industry = e.industry.trim().to_string();
                e
            })
            .collect();
        events.sort_by(|a, b| (&a.ticker, a.event_date).cmp(&(&b.ticker, b.event_date)));
        Self { events }
    }

    /// Parse a catalog from CSV.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let events = csv
            .deserialize()
            .collect::<std::result::Result<Vec<EventRecord>, _>>()?;
        debug!(events = events.len(), "loaded event catalog");
        Ok(Self::new(events))
    }

    /// Parse a catalog from a CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// All events, ordered by ticker then date.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sorted distinct non-empty industries.
    pub fn industries(&self) -> Vec<&str> {
        self.events
            .iter()
            .map(|e| e.industry.as_str())
            .filter(|i| !i.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct tickers within an industry.
    pub fn tickers(&self, industry: &str) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.industry.eq_ignore_ascii_case(industry))
            .map(|e| e.ticker.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct event dates for a ticker within an industry.
    pub fn event_dates(&self, industry: &str, ticker: &str) -> Vec<NaiveDate> {
        self.events
            .iter()
            .filter(|e| e.industry.eq_ignore_ascii_case(industry))
            .filter(|e| e.ticker.eq_ignore_ascii_case(ticker))
            .map(|e| e.event_date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// First event recorded for `ticker` on `date`.
    pub fn find(&self, ticker: &str, date: NaiveDate) -> Option<&EventRecord> {
        self.events
            .iter()
            .find(|e| e.event_date == date && e.ticker.eq_ignore_ascii_case(ticker))
    }

    /// Like [`find`](Self::find) but an error when absent.
    pub fn get(&self, ticker: &str, date: NaiveDate) -> Result<&EventRecord> {
        self.find(ticker, date).ok_or_else(|| DataError::MissingData {
            symbol: ticker.to_ascii_uppercase(),
            reason: format!("no catalogued event on {date}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const CSV: &str = "\
ticker,industry,event_date,headline,news_type,sentiment
aapl,Technology,2024-05-02,Apple beats estimates,Earnings,Positive
MSFT,Technology,2024-04-25 16:05:00,Microsoft cloud growth,Earnings,positive
XOM,Energy,2024-04-26,Exxon misses,Earnings,Negative
AAPL,Technology,2024-06-10,WWDC keynote,Product,
AAPL,Technology,2024-05-02,Buyback announced,Capital,Neutral
";

    fn catalog() -> EventCatalog {
        EventCatalog::from_reader(CSV.as_bytes()).unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_selection_lists() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.industries(), vec!["Energy", "Technology"]);
        assert_eq!(catalog.tickers("Technology"), vec!["AAPL", "MSFT"]);
        assert_eq!(
            catalog.event_dates("Technology", "aapl"),
            vec![date(5, 2), date(6, 10)]
        );
    }

    #[test]
    fn test_event_details() {
        let catalog = catalog();
        let event = catalog.get("MSFT", date(4, 25)).unwrap();
        assert_eq!(event.headline, "Microsoft cloud growth");
        assert_eq!(event.sentiment, Sentiment::Positive);

        let wwdc = catalog.find("AAPL", date(6, 10)).unwrap();
        assert_eq!(wwdc.sentiment, Sentiment::Neutral);

        assert!(catalog.get("AAPL", date(1, 1)).is_err());
    }

    #[rstest]
    #[case("Positive", Sentiment::Positive)]
    #[case(" NEGATIVE ", Sentiment::Negative)]
    #[case("mixed", Sentiment::Neutral)]
    #[case("", Sentiment::Neutral)]
    fn test_sentiment_parsing(#[case] raw: &str, #[case] expected: Sentiment) {
        assert_eq!(Sentiment::from(raw.to_string()), expected);
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let csv = "ticker,industry,event_date,headline,news_type,sentiment\nAAPL,Tech,05/02/2024,x,y,Positive\n";
        assert!(EventCatalog::from_reader(csv.as_bytes()).is_err());
    }
}
