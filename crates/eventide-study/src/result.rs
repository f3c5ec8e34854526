//! Result Assembler
//!
//! Joins the per-day outputs of the abnormal return, CAR and confidence
//! stages into one [`EventStudyResult`], ordered by relative day.

use crate::abnormal::AbnormalReturns;
use crate::car::CumulativeReturns;
use crate::confidence::{ConfidenceBand, ConfidenceLevel, Reliability};
use crate::error::{Result, StudyError};
use crate::model::{ModelChoice, ModelFit};
use crate::window::WindowSplit;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One event-window day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventDayRecord {
    /// Trading days relative to day 0
    pub relative_day: i64,
    /// Calendar date of the trading day
    pub date: NaiveDate,
    /// Realised simple return
    pub stock_return: f64,
    /// Model-implied normal return
    pub expected_return: f64,
    /// `stock_return - expected_return`
    pub abnormal_return: f64,
    /// CAR through this day
    pub cumulative_abnormal_return: f64,
    /// Cumulative realised return through this day
    pub cumulative_stock_return: f64,
    /// Cumulative normal return through this day
    pub cumulative_expected_return: f64,
    /// Lower confidence bound on the CAR
    pub ci_lower: f64,
    /// Upper confidence bound on the CAR
    pub ci_upper: f64,
}

/// Outcome of one `(ticker, event date, model)` study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStudyResult {
    ticker: String,
    model: ModelChoice,
    event_date: NaiveDate,
    event_trading_date: NaiveDate,
    confidence_level: ConfidenceLevel,
    reliability: Reliability,
    fit: ModelFit,
    records: Vec<EventDayRecord>,
}

impl EventStudyResult {
    /// Ticker studied.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Return model used.
    pub const fn model(&self) -> ModelChoice {
        self.model
    }

    /// Requested event date.
    pub const fn event_date(&self) -> NaiveDate {
        self.event_date
    }

    /// Trading date resolved as relative day 0.
    pub const fn event_trading_date(&self) -> NaiveDate {
        self.event_trading_date
    }

    /// Confidence level of the band.
    pub const fn confidence_level(&self) -> ConfidenceLevel {
        self.confidence_level
    }

    /// Whether the band is statistically meaningful.
    pub const fn reliability(&self) -> Reliability {
        self.reliability
    }

    /// Estimation-window fit.
    pub const fn fit(&self) -> &ModelFit {
        &self.fit
    }

    /// Per-day records in relative-day order.
    pub fn records(&self) -> &[EventDayRecord] {
        &self.records
    }

    /// Record for a relative day.
    pub fn record(&self, relative_day: i64) -> Option<&EventDayRecord> {
        let first = self.records.first()?.relative_day;
        let idx = usize::try_from(relative_day - first).ok()?;
        self.records.get(idx)
    }

    /// Last record of the window.
    pub fn last_record(&self) -> Option<&EventDayRecord> {
        self.records.last()
    }

    /// CAR at the end of the window.
    pub fn final_car(&self) -> Option<f64> {
        self.last_record().map(|r| r.cumulative_abnormal_return)
    }

    /// Cumulative realised return at the end of the window.
    pub fn total_stock_return(&self) -> Option<f64> {
        self.last_record().map(|r| r.cumulative_stock_return)
    }

    /// Cumulative normal return at the end of the window.
    pub fn total_expected_return(&self) -> Option<f64> {
        self.last_record().map(|r| r.cumulative_expected_return)
    }

    /// Number of event-window days.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the result holds no days.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Every per-day output of one study, before assembly.
#[derive(Debug)]
pub struct StudyParts<'a> {
    /// Ticker studied
    pub ticker: &'a str,
    /// Requested event date
    pub event_date: NaiveDate,
    /// Estimation and event windows
    pub split: &'a WindowSplit,
    /// Estimation fit
    pub fit: ModelFit,
    /// Daily returns over the event window
    pub returns: &'a AbnormalReturns,
    /// Cumulative returns over the event window
    pub cumulative: &'a CumulativeReturns,
    /// Confidence band around the CAR
    pub band: &'a ConfidenceBand,
    /// Level the band was built at
    pub confidence_level: ConfidenceLevel,
}

/// Zip per-day outputs into an [`EventStudyResult`].
///
/// # Errors
/// * `InvalidInput` if the per-day columns disagree in length.
/// * `InvalidEventDate` if relative day 0 is absent.
pub fn assemble(parts: StudyParts<'_>) -> Result<EventStudyResult> {
    let split = parts.split;
    let n = split.relative_days.len();
    let lengths = [
        split.event.len(),
        parts.returns.len(),
        parts.cumulative.abnormal.len(),
        parts.band.lower.len(),
    ];
    if lengths.iter().any(|len| *len != n) {
        return Err(StudyError::InvalidInput(format!(
            "per-day outputs disagree in length: {n} relative days vs {lengths:?}"
        )));
    }

    if !split.relative_days.contains(&0) {
        let dates = split.event.dates();
        return Err(StudyError::InvalidEventDate {
            event_date: parts.event_date,
            first_available: dates.first().copied().unwrap_or(parts.event_date),
            last_available: dates.last().copied().unwrap_or(parts.event_date),
        });
    }

    let records = (0..n)
        .map(|i| EventDayRecord {
            relative_day: split.relative_days[i],
            date: split.event.dates()[i],
            stock_return: parts.returns.stock[i],
            expected_return: parts.returns.expected[i],
            abnormal_return: parts.returns.abnormal[i],
            cumulative_abnormal_return: parts.cumulative.abnormal[i],
            cumulative_stock_return: parts.cumulative.stock[i],
            cumulative_expected_return: parts.cumulative.expected[i],
            ci_lower: parts.band.lower[i],
            ci_upper: parts.band.upper[i],
        })
        .collect();

    Ok(EventStudyResult {
        ticker: parts.ticker.to_string(),
        model: parts.fit.model(),
        event_date: parts.event_date,
        event_trading_date: split.event_trading_date,
        confidence_level: parts.confidence_level,
        reliability: parts.band.reliability,
        fit: parts.fit,
        records,
    })
}
