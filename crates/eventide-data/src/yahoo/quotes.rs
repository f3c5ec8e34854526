//! Quote data fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::source::{FactorSource, PriceHistorySource, validate_range};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate};
use eventide_study::{FactorSeries, ModelChoice, PricePoint, PriceSeries};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};
use yahoo_finance_api as yahoo;

/// Configuration for the Yahoo Finance provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    /// Delay applied after every request, in milliseconds (default: 1000)
    pub rate_limit_delay_ms: u64,

    /// Index used as the market benchmark (default: `^GSPC`)
    pub benchmark_symbol: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: 1000,
            benchmark_symbol: "^GSPC".to_string(),
        }
    }
}

/// A single daily quote as returned by Yahoo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyQuote {
    /// Trading date
    pub date: NaiveDate,
    /// Raw close
    pub close: f64,
    /// Split and dividend adjusted close
    pub adjusted_close: f64,
    /// Volume
    pub volume: u64,
}

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    config: YahooConfig,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a provider with default rate limiting (1 req/sec) and `^GSPC` benchmark.
    pub fn new() -> Result<Self> {
        Self::with_config(YahooConfig::default())
    }

    /// Create a provider with a custom configuration.
    pub fn with_config(config: YahooConfig) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            config,
        })
    }

    /// Active configuration.
    pub const fn config(&self) -> &YahooConfig {
        &self.config
    }

    /// Fetch daily quotes for a single symbol, both ends inclusive.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g., "AAPL")
    /// * `start` - First calendar date
    /// * `end` - Last calendar date
    pub async fn fetch_quotes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyQuote>> {
        validate_range(start, end)?;
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let start_time = to_offset_date_time(start)?;
        let end_time = to_offset_date_time(end + ChronoDuration::days(1))?;

        debug!(symbol, %start, %end, "requesting Yahoo quote history");
        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let mut daily = Vec::with_capacity(quotes.len());
        for q in &quotes {
            let seconds = i64::try_from(q.timestamp)
                .map_err(|e| DataError::TimeConversion(e.to_string()))?;
            let date = DateTime::from_timestamp(seconds, 0)
                .ok_or_else(|| DataError::TimeConversion(format!("timestamp {seconds}")))?
                .date_naive();
            daily.push(DailyQuote {
                date,
                close: q.close,
                adjusted_close: q.adjclose,
                volume: q.volume,
            });
        }

        info!(symbol, quotes = daily.len(), "fetched Yahoo quotes");

        // Apply rate limiting
        sleep(Duration::from_millis(self.config.rate_limit_delay_ms)).await;

        Ok(daily)
    }

    /// Fetch the configured benchmark index as a return series.
    pub async fn fetch_benchmark(&self, start: NaiveDate, end: NaiveDate) -> Result<FactorSeries> {
        let prices = self
            .fetch_price_history(&self.config.benchmark_symbol, start, end)
            .await?;
        Ok(FactorSeries::benchmark_from_prices(&prices))
    }
}

#[async_trait]
impl PriceHistorySource for YahooQuoteProvider {
    async fn fetch_price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        let quotes = self.fetch_quotes(ticker, start, end).await?;
        quotes_to_series(ticker, &quotes)
    }
}

#[async_trait]
impl FactorSource for YahooQuoteProvider {
    async fn fetch_factor_series(
        &self,
        model: ModelChoice,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FactorSeries> {
        match model {
            ModelChoice::MarketAdjusted => self.fetch_benchmark(start, end).await,
            ModelChoice::FamaFrench3 => Err(DataError::Unsupported(
                "Yahoo Finance does not publish Fama-French factors".to_string(),
            )),
        }
    }
}

/// Build a validated price series from adjusted closes.
///
/// Quotes are ordered by date; a repeated date keeps the later quote, and
/// quotes without a usable adjusted close are dropped.
pub fn quotes_to_series(ticker: &str, quotes: &[DailyQuote]) -> Result<PriceSeries> {
    let mut sorted = quotes.to_vec();
    sorted.sort_by_key(|q| q.date);

    let mut points: Vec<PricePoint> = Vec::with_capacity(sorted.len());
    for quote in sorted {
        if !quote.adjusted_close.is_finite() || quote.adjusted_close <= 0.0 {
            debug!(ticker, date = %quote.date, close = quote.adjusted_close, "dropping unusable quote");
            continue;
        }
        let point = PricePoint {
            date: quote.date,
            close: quote.adjusted_close,
        };
        match points.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => points.push(point),
        }
    }

    if points.is_empty() {
        return Err(DataError::MissingData {
            symbol: ticker.to_string(),
            reason: "No usable adjusted closes".to_string(),
        });
    }

    Ok(PriceSeries::new(ticker.to_ascii_uppercase(), points)?)
}

fn to_offset_date_time(date: NaiveDate) -> Result<time::OffsetDateTime> {
    let seconds = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DataError::TimeConversion(format!("midnight of {date}")))?
        .and_utc()
        .timestamp();
    time::OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(day: u32, adjusted_close: f64) -> DailyQuote {
        DailyQuote {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            close: adjusted_close,
            adjusted_close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_quotes_to_series_sorts_and_dedupes() {
        let quotes = [quote(5, 101.0), quote(4, 100.0), quote(5, 102.0), quote(6, f64::NAN)];
        let series = quotes_to_series("aapl", &quotes).unwrap();

        assert_eq!(series.ticker(), "AAPL");
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[1].close, 102.0);
    }

    #[test]
    fn test_quotes_to_series_requires_data() {
        let quotes = [quote(4, 0.0)];
        assert!(matches!(
            quotes_to_series("AAPL", &quotes),
            Err(DataError::MissingData { .. })
        ));
    }

    #[test]
    fn test_offset_date_time_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let t = to_offset_date_time(date).unwrap();
        assert_eq!(t.unix_timestamp(), 1_704_153_600);
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_fetch_quotes() {
        let provider = YahooQuoteProvider::new().unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let prices = provider.fetch_price_history("AAPL", start, end).await.unwrap();
        assert!(prices.len() > 15);
    }

    #[tokio::test]
    async fn test_invalid_date_range() {
        let provider = YahooQuoteProvider::new().unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let result = provider.fetch_quotes("AAPL", start, end).await;
        assert!(matches!(result, Err(DataError::InvalidDateRange { .. })));
    }

    #[tokio::test]
    async fn test_invalid_symbol() {
        let provider = YahooQuoteProvider::new().unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let result = provider.fetch_quotes("  ", start, start).await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }

    #[tokio::test]
    async fn test_fama_french_unsupported() {
        let provider = YahooQuoteProvider::new().unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let result = provider
            .fetch_factor_series(ModelChoice::FamaFrench3, start, start)
            .await;
        assert!(matches!(result, Err(DataError::Unsupported(_))));
    }
}
