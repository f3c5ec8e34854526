//! Plot-ready series for the CAR and confidence-band graphs.
//!
//! Each series is a projection of [`EventStudyResult`] records keyed by
//! relative day. Values are in percent so renderers can plot them directly.

use chrono::NaiveDate;
use eventide_study::{EventStudyResult, Reliability};
use serde::{Deserialize, Serialize};

/// One point of the CAR graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CarChartPoint {
    /// Trading days relative to the event.
    pub relative_day: i64,
    /// Trading date.
    pub date: NaiveDate,
    /// Cumulative abnormal return, in percent.
    pub car_pct: f64,
    /// Cumulative actual return, in percent.
    pub actual_pct: f64,
    /// Cumulative expected return, in percent.
    pub expected_pct: f64,
}

/// Cumulative actual, expected and abnormal returns across the event window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarChartSeries {
    /// Chart title.
    pub title: String,
    /// Points ordered by relative day.
    pub points: Vec<CarChartPoint>,
}

impl CarChartSeries {
    /// Project a study result.
    pub fn from_result(result: &EventStudyResult) -> Self {
        let points = result
            .records()
            .iter()
            .map(|r| CarChartPoint {
                relative_day: r.relative_day,
                date: r.date,
                car_pct: r.cumulative_abnormal_return * 100.0,
                actual_pct: r.cumulative_stock_return * 100.0,
                expected_pct: r.cumulative_expected_return * 100.0,
            })
            .collect();

        Self {
            title: format!(
                "{}: Cumulative Abnormal Returns ({})",
                result.ticker(),
                result.model().label()
            ),
            points,
        }
    }

    /// Relative days, the x axis.
    pub fn relative_days(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.relative_day).collect()
    }
}

/// One point of the confidence-band graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceChartPoint {
    /// Trading days relative to the event.
    pub relative_day: i64,
    /// Cumulative abnormal return, in percent.
    pub car_pct: f64,
    /// Lower band, in percent.
    pub lower_pct: f64,
    /// Upper band, in percent.
    pub upper_pct: f64,
}

/// CAR with its confidence band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceChartSeries {
    /// Chart title.
    pub title: String,
    /// Confidence level of the band.
    pub confidence_level: f64,
    /// Renderers should mark a degenerate band as unreliable.
    pub reliability: Reliability,
    /// Points ordered by relative day.
    pub points: Vec<ConfidenceChartPoint>,
}

impl ConfidenceChartSeries {
    /// Project a study result.
    pub fn from_result(result: &EventStudyResult) -> Self {
        let level = result.confidence_level().value();
        let points = result
            .records()
            .iter()
            .map(|r| ConfidenceChartPoint {
                relative_day: r.relative_day,
                car_pct: r.cumulative_abnormal_return * 100.0,
                lower_pct: r.ci_lower * 100.0,
                upper_pct: r.ci_upper * 100.0,
            })
            .collect();

        Self {
            title: format!(
                "{}: CAR with {:.0}% Confidence Interval",
                result.ticker(),
                level * 100.0
            ),
            confidence_level: level,
            reliability: result.reliability(),
            points,
        }
    }
}
