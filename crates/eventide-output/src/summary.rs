//! Event impact metrics.
//!
//! The three headline numbers shown for an event study: the cumulative actual
//! return, the cumulative normal (expected) return and the CAR, all over the
//! whole event window and expressed in percent.

use chrono::NaiveDate;
use eventide_study::{EventStudyResult, ModelChoice, Reliability};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Headline impact of an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpactMetrics {
    /// Ticker studied.
    pub ticker: String,

    /// Return model used.
    pub model: ModelChoice,

    /// Requested event date.
    pub event_date: NaiveDate,

    /// Cumulative actual return over the event window, in percent.
    pub actual_return_pct: f64,

    /// Cumulative expected return over the event window, in percent.
    pub expected_return_pct: f64,

    /// Final cumulative abnormal return, in percent.
    pub car_pct: f64,

    /// Lower confidence bound on the final CAR, in percent.
    pub ci_lower_pct: f64,

    /// Upper confidence bound on the final CAR, in percent.
    pub ci_upper_pct: f64,

    /// Confidence level of the bounds.
    pub confidence_level: f64,

    /// Whether the bounds are statistically meaningful.
    pub reliability: Reliability,
}

impl ImpactMetrics {
    /// Metrics at the last day of the event window, `None` for an empty result.
    pub fn from_result(result: &EventStudyResult) -> Option<Self> {
        let last = result.last_record()?;
        Some(Self {
            ticker: result.ticker().to_string(),
            model: result.model(),
            event_date: result.event_date(),
            actual_return_pct: last.cumulative_stock_return * 100.0,
            expected_return_pct: last.cumulative_expected_return * 100.0,
            car_pct: last.cumulative_abnormal_return * 100.0,
            ci_lower_pct: last.ci_lower * 100.0,
            ci_upper_pct: last.ci_upper * 100.0,
            confidence_level: result.confidence_level().value(),
            reliability: result.reliability(),
        })
    }

    /// Whether the final confidence band lies entirely above or below zero.
    ///
    /// Always `false` for a degenerate band.
    pub fn band_excludes_zero(&self) -> bool {
        self.reliability.is_reliable() && (self.ci_lower_pct > 0.0 || self.ci_upper_pct < 0.0)
    }
}

/// Impact metrics for a study, `None` when it has no records.
pub fn generate_impact_metrics(result: &EventStudyResult) -> Option<ImpactMetrics> {
    ImpactMetrics::from_result(result)
}

impl fmt::Display for ImpactMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Actual Return: {:.2}% | Expected Return (Normal): {:.2}% | CAR (Impact): {:.2}%",
            self.actual_return_pct, self.expected_return_pct, self.car_pct
        )
    }
}
