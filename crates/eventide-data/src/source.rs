//! Collaborator interfaces consumed by the event-study pipeline.

use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use eventide_study::{FactorSeries, ModelChoice, PriceSeries};
use std::sync::Arc;

/// Source of daily closing prices for one instrument.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Closing prices for `ticker` on every trading day in `[start, end]`.
    async fn fetch_price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries>;
}

/// Source of the benchmark or factor series a model regresses on.
#[async_trait]
pub trait FactorSource: Send + Sync {
    /// Benchmark returns for [`ModelChoice::MarketAdjusted`], Fama-French
    /// factors for [`ModelChoice::FamaFrench3`], covering `[start, end]`.
    async fn fetch_factor_series(
        &self,
        model: ModelChoice,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FactorSeries>;
}

#[async_trait]
impl<T: PriceHistorySource + ?Sized> PriceHistorySource for Arc<T> {
    async fn fetch_price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        (**self).fetch_price_history(ticker, start, end).await
    }
}

#[async_trait]
impl<T: FactorSource + ?Sized> FactorSource for Arc<T> {
    async fn fetch_factor_series(
        &self,
        model: ModelChoice,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FactorSeries> {
        (**self).fetch_factor_series(model, start, end).await
    }
}

/// Routes benchmark requests to one source and Fama-French requests to another.
#[derive(Debug, Clone)]
pub struct CompositeFactorSource<B, F> {
    benchmark: B,
    fama_french: F,
}

impl<B, F> CompositeFactorSource<B, F> {
    /// Combine a benchmark source with a Fama-French source.
    pub const fn new(benchmark: B, fama_french: F) -> Self {
        Self {
            benchmark,
            fama_french,
        }
    }
}

#[async_trait]
impl<B: FactorSource, F: FactorSource> FactorSource for CompositeFactorSource<B, F> {
    async fn fetch_factor_series(
        &self,
        model: ModelChoice,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FactorSeries> {
        match model {
            ModelChoice::MarketAdjusted => {
                self.benchmark.fetch_factor_series(model, start, end).await
            }
            ModelChoice::FamaFrench3 => {
                self.fama_french.fetch_factor_series(model, start, end).await
            }
        }
    }
}

/// Reject ranges whose start follows their end.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(DataError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(&'static str);

    #[async_trait]
    impl FactorSource for Fixed {
        async fn fetch_factor_series(
            &self,
            _model: ModelChoice,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<FactorSeries> {
            Err(DataError::Unsupported(self.0.to_string()))
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[tokio::test]
    async fn test_composite_routes_by_model() {
        let source = CompositeFactorSource::new(Fixed("benchmark"), Fixed("ff3"));

        let err = source
            .fetch_factor_series(ModelChoice::MarketAdjusted, date(1), date(2))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported request: benchmark");

        let err = source
            .fetch_factor_series(ModelChoice::FamaFrench3, date(1), date(2))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported request: ff3");
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(date(1), date(1)).is_ok());
        assert!(matches!(
            validate_range(date(3), date(1)),
            Err(DataError::InvalidDateRange { .. })
        ));
    }
}
