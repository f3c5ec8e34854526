//! Error types for the event-study engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for event-study operations.
pub type Result<T> = std::result::Result<T, StudyError>;

/// Errors that can occur while computing an event study.
///
/// Every variant is raised at the point where the violated precondition is
/// checked. No partial result is ever produced alongside an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StudyError {
    /// Not enough aligned trading days for a window or a regression.
    #[error("Insufficient data for {context}: need at least {required} observations, got {available}")]
    InsufficientData {
        /// Which stage ran out of data
        context: String,
        /// Required number of observations
        required: usize,
        /// Available number of observations
        available: usize,
    },

    /// Ticker and factor date sets do not intersect.
    #[error(
        "Misaligned data: ticker returns span {ticker_start}..={ticker_end}, factor series spans {factor_start}..={factor_end}, no common trading dates"
    )]
    MisalignedData {
        /// First ticker return date
        ticker_start: NaiveDate,
        /// Last ticker return date
        ticker_end: NaiveDate,
        /// First factor date
        factor_start: NaiveDate,
        /// Last factor date
        factor_end: NaiveDate,
    },

    /// The factor design matrix is rank-deficient.
    #[error("Singular regression: {reason}")]
    SingularRegression {
        /// What made the design matrix singular
        reason: String,
    },

    /// The event date cannot be placed inside the available data.
    #[error(
        "Invalid event date {event_date}: aligned data covers {first_available}..={last_available}"
    )]
    InvalidEventDate {
        /// Requested event date
        event_date: NaiveDate,
        /// First aligned trading date
        first_available: NaiveDate,
        /// Last aligned trading date
        last_available: NaiveDate,
    },

    /// Malformed series or configuration.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StudyError {
    /// Shorthand for [`StudyError::InsufficientData`].
    pub fn insufficient(context: impl Into<String>, required: usize, available: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            required,
            available,
        }
    }

    /// Shorthand for [`StudyError::SingularRegression`].
    pub fn singular(reason: impl Into<String>) -> Self {
        Self::SingularRegression {
            reason: reason.into(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "insufficient_data",
            Self::MisalignedData { .. } => "misaligned_data",
            Self::SingularRegression { .. } => "singular_regression",
            Self::InvalidEventDate { .. } => "invalid_event_date",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_message_carries_counts() {
        let err = StudyError::insufficient("estimation window", 30, 12);
        let msg = err.to_string();
        assert!(msg.contains("estimation window"));
        assert!(msg.contains("30"));
        assert!(msg.contains("12"));
        assert_eq!(err.kind(), "insufficient_data");
    }

    #[test]
    fn test_invalid_event_date_message() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let err = StudyError::InvalidEventDate {
            event_date: d(30),
            first_available: d(1),
            last_available: d(29),
        };
        assert!(err.to_string().contains("2024-03-30"));
        assert_eq!(err.kind(), "invalid_event_date");
    }
}
