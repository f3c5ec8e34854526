//! Study configuration.

use crate::confidence::ConfidenceLevel;
use crate::error::{Result, StudyError};
use crate::window::EventWindowSpec;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Configuration for event studies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Trading days used to fit the return model (default: 30)
    pub estimation_window_length: usize,

    /// Trading days on each side of the event (default: 10)
    pub event_window_radius: usize,

    /// Two-sided confidence level for the CAR band (default: 0.95)
    pub confidence_level: f64,

    /// Calendar days of history fetched on each side of the event (default: 120)
    /// Must be wide enough to hold the estimation window, the pre-event days
    /// and the non-trading days between them.
    pub fetch_offset_days: u32,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            estimation_window_length: 30,
            event_window_radius: 10,
            confidence_level: 0.95,
            fetch_offset_days: 120,
        }
    }
}

impl StudyConfig {
    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if self.estimation_window_length == 0 {
            return Err(StudyError::InvalidInput(
                "estimation_window_length must be positive".to_string(),
            ));
        }
        if self.fetch_offset_days == 0 {
            return Err(StudyError::InvalidInput(
                "fetch_offset_days must be positive".to_string(),
            ));
        }
        ConfidenceLevel::new(self.confidence_level)?;
        Ok(())
    }

    /// Validated confidence level.
    pub fn confidence(&self) -> Result<ConfidenceLevel> {
        ConfidenceLevel::new(self.confidence_level)
    }

    /// Window geometry for an event on `event_date`.
    pub const fn window_spec(&self, event_date: NaiveDate) -> EventWindowSpec {
        EventWindowSpec::new(
            event_date,
            self.estimation_window_length,
            self.event_window_radius,
        )
    }
}
