//! Fetch-then-compute pipeline over the data collaborators.

use eventide_data::{DataError, FactorSource, PriceHistorySource};
use eventide_study::{AnalysisRequest, EventStudyResult, StudyConfig, StudyError, run_analysis};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fetching prices or factors failed.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// The study itself failed.
    #[error("Study error: {0}")]
    Study(#[from] StudyError),
}

/// Runs event studies by fetching inputs from a price source and a factor
/// source.
#[derive(Debug, Clone)]
pub struct EventStudyPipeline<P, F> {
    prices: P,
    factors: F,
    config: StudyConfig,
}

impl<P, F> EventStudyPipeline<P, F>
where
    P: PriceHistorySource,
    F: FactorSource,
{
    /// Create a pipeline with the default study configuration.
    pub fn new(prices: P, factors: F) -> Self {
        Self::with_config(prices, factors, StudyConfig::default())
    }

    /// Create a pipeline with a custom study configuration.
    pub const fn with_config(prices: P, factors: F, config: StudyConfig) -> Self {
        Self {
            prices,
            factors,
            config,
        }
    }

    /// Active study configuration.
    pub const fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Run one study.
    ///
    /// Price history and factors are fetched concurrently over
    /// `[event - offset, event + offset]`.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<EventStudyResult, PipelineError> {
        self.config.validate()?;
        let (start, end) = request.fetch_range(self.config.fetch_offset_days)?;
        info!(%request, %start, %end, "running event study");

        let (prices, factors) = futures::try_join!(
            self.prices.fetch_price_history(request.ticker(), start, end),
            self.factors.fetch_factor_series(request.model(), start, end),
        )?;
        debug!(
            prices = prices.len(),
            factors = factors.len(),
            "fetched study inputs"
        );

        Ok(run_analysis(request, &self.config, &prices, &factors)?)
    }

    /// Run independent studies with at most `concurrency` in flight.
    ///
    /// Results are returned in the order of `requests`; a failed study does
    /// not stop the others.
    pub async fn run_all(
        &self,
        requests: &[AnalysisRequest],
        concurrency: usize,
    ) -> Vec<Result<EventStudyResult, PipelineError>> {
        let mut results: Vec<(usize, Result<EventStudyResult, PipelineError>)> =
            stream::iter(requests.iter().enumerate())
                .map(|(idx, request)| async move { (idx, self.run(request).await) })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

        results.sort_by_key(|(idx, _)| *idx);

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            warn!(failed, total = requests.len(), "some event studies failed");
        }
        info!(total = requests.len(), "event studies complete");

        results.into_iter().map(|(_, r)| r).collect()
    }
}
