//! The event-study entry point.

use crate::abnormal::abnormal_returns;
use crate::align::align_returns;
use crate::car::aggregate;
use crate::config::StudyConfig;
use crate::confidence::{ConfidenceLevel, confidence_band};
use crate::error::{Result, StudyError};
use crate::model::ModelChoice;
use crate::request::AnalysisRequest;
use crate::result::{EventStudyResult, StudyParts, assemble};
use crate::series::{FactorSeries, PriceSeries};
use crate::window::{EventWindowSpec, split_windows};
use chrono::NaiveDate;
use tracing::{info, instrument};

/// Run one event study.
///
/// Aligns `prices` with `factors`, splits the estimation and event windows,
/// fits `model_choice` on the estimation window and measures abnormal
/// returns, their cumulative sums and a confidence band over the event
/// window.
///
/// `factors` must be a benchmark series for [`ModelChoice::MarketAdjusted`]
/// and a Fama-French series for [`ModelChoice::FamaFrench3`].
///
/// # Errors
/// Any [`StudyError`] raised by a stage; no partial result is produced.
#[instrument(
    skip_all,
    fields(
        ticker = %prices.ticker(),
        model = model_choice.short_name(),
        event_date = %event_date,
    )
)]
pub fn compute_event_study(
    model_choice: ModelChoice,
    prices: &PriceSeries,
    factors: &FactorSeries,
    event_date: NaiveDate,
    estimation_window_length: usize,
    event_window_radius: usize,
    confidence_level: f64,
) -> Result<EventStudyResult> {
    let level = ConfidenceLevel::new(confidence_level)?;
    let expected_kind = match model_choice {
        ModelChoice::MarketAdjusted => "benchmark",
        ModelChoice::FamaFrench3 => "fama-french",
    };
    if factors.kind() != expected_kind {
        return Err(StudyError::InvalidInput(format!(
            "{} needs a {} series, got {}",
            model_choice.label(),
            expected_kind,
            factors.kind()
        )));
    }

    let spec = EventWindowSpec::new(event_date, estimation_window_length, event_window_radius);

    let aligned = align_returns(prices, factors)?;
    let split = split_windows(&aligned, &spec)?;

    let fitter = model_choice.fitter();
    let fit = fitter.fit(&split.estimation)?;
    let returns = abnormal_returns(fitter, &fit, &split.event)?;
    let cumulative = aggregate(&returns);
    let band = confidence_band(&cumulative.abnormal, fit.residual_variance(), level)?;

    let result = assemble(StudyParts {
        ticker: prices.ticker(),
        event_date,
        split: &split,
        fit,
        returns: &returns,
        cumulative: &cumulative,
        band: &band,
        confidence_level: level,
    })?;

    info!(
        day_zero = %result.event_trading_date(),
        days = result.len(),
        car = ?result.final_car(),
        reliable = result.reliability().is_reliable(),
        "event study complete"
    );

    Ok(result)
}

/// Run the study described by `request` under `config`.
///
/// # Errors
/// `InvalidInput` when the config is invalid or the price series belongs to a
/// different ticker, otherwise as [`compute_event_study`].
pub fn run_analysis(
    request: &AnalysisRequest,
    config: &StudyConfig,
    prices: &PriceSeries,
    factors: &FactorSeries,
) -> Result<EventStudyResult> {
    config.validate()?;
    if !prices.ticker().eq_ignore_ascii_case(request.ticker()) {
        return Err(StudyError::InvalidInput(format!(
            "price history is for {}, request is for {}",
            prices.ticker(),
            request.ticker()
        )));
    }

    compute_event_study(
        request.model(),
        prices,
        factors,
        request.event_date(),
        config.estimation_window_length,
        config.event_window_radius,
        config.confidence_level,
    )
}
