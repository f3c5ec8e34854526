//! Analysis requests.

use crate::error::{Result, StudyError};
use crate::model::ModelChoice;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable `(ticker, event date, model)` triple identifying one study.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisRequest {
    ticker: String,
    event_date: NaiveDate,
    model: ModelChoice,
}

impl AnalysisRequest {
    /// Create a request; the ticker is trimmed and upper-cased.
    pub fn new(ticker: impl AsRef<str>, event_date: NaiveDate, model: ModelChoice) -> Result<Self> {
        let ticker = ticker.as_ref().trim().to_ascii_uppercase();
        if ticker.is_empty() {
            return Err(StudyError::InvalidInput("ticker must not be empty".to_string()));
        }
        Ok(Self {
            ticker,
            event_date,
            model,
        })
    }

    /// Ticker symbol.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Calendar date of the event.
    pub const fn event_date(&self) -> NaiveDate {
        self.event_date
    }

    /// Return model to apply.
    pub const fn model(&self) -> ModelChoice {
        self.model
    }

    /// Same ticker and date under another model.
    pub fn with_model(&self, model: ModelChoice) -> Self {
        Self {
            model,
            ..self.clone()
        }
    }

    /// Calendar span `[event - offset, event + offset]` to fetch history for.
    ///
    /// # Errors
    /// `InvalidInput` when either end falls outside the representable dates.
    pub fn fetch_range(&self, offset_days: u32) -> Result<(NaiveDate, NaiveDate)> {
        let offset = Duration::days(i64::from(offset_days));
        match (
            self.event_date.checked_sub_signed(offset),
            self.event_date.checked_add_signed(offset),
        ) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(StudyError::InvalidInput(format!(
                "fetch offset of {offset_days} days around {} is out of range",
                self.event_date
            ))),
        }
    }
}

impl fmt::Display for AnalysisRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} ({})",
            self.ticker,
            self.event_date,
            self.model.short_name()
        )
    }
}
