//! Window Splitter
//!
//! Partitions an aligned return table into the estimation window used to fit
//! the return model and the event window the model is applied to.
//!
//! ```text
//!   ... | estimation (L days) | -r ... 0 ... +r | ...
//!                             ^ event window start
//! ```
//!
//! Day 0 is the first aligned trading day on or after the event date. The
//! estimation window ends on the trading day before the event window starts,
//! so no event-window observation can leak into the fit.

use crate::align::AlignedReturns;
use crate::error::{Result, StudyError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Event date plus the window geometry, in trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindowSpec {
    /// Calendar date of the event
    pub event_date: NaiveDate,
    /// Number of trading days in the estimation window
    pub estimation_window_length: usize,
    /// Trading days on each side of day 0
    pub event_window_radius: usize,
}

impl EventWindowSpec {
    /// Create a window specification.
    pub const fn new(
        event_date: NaiveDate,
        estimation_window_length: usize,
        event_window_radius: usize,
    ) -> Self {
        Self {
            event_date,
            estimation_window_length,
            event_window_radius,
        }
    }

    /// Total trading days in the event window, `2r + 1`.
    pub const fn event_window_len(&self) -> usize {
        2 * self.event_window_radius + 1
    }

    /// Relative day of the first event-window observation.
    pub const fn first_relative_day(&self) -> i64 {
        -(self.event_window_radius as i64)
    }
}

/// The two disjoint windows cut from an aligned table.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSplit {
    /// Observations used to fit the return model
    pub estimation: AlignedReturns,
    /// Observations the fitted model is applied to
    pub event: AlignedReturns,
    /// Relative day of each event-window row, `-r..=r`
    pub relative_days: Vec<i64>,
    /// Trading date resolved as day 0
    pub event_trading_date: NaiveDate,
}

impl WindowSplit {
    /// Last estimation date and first event date.
    pub fn boundary(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.estimation.dates().last()?, *self.event.dates().first()?))
    }
}

/// Cut the estimation and event windows out of `aligned`.
///
/// # Errors
/// * `InvalidEventDate` when the event date precedes the first aligned day or
///   follows the last one.
/// * `InsufficientData` when either window cannot be fully populated.
pub fn split_windows(aligned: &AlignedReturns, spec: &EventWindowSpec) -> Result<WindowSplit> {
    if spec.estimation_window_length == 0 {
        return Err(StudyError::InvalidInput(
            "estimation window length must be positive".to_string(),
        ));
    }

    let (first, last) = match (aligned.dates().first(), aligned.dates().last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(StudyError::insufficient("window split", 1, 0)),
    };

    let invalid_date = || StudyError::InvalidEventDate {
        event_date: spec.event_date,
        first_available: first,
        last_available: last,
    };

    if spec.event_date < first {
        return Err(invalid_date());
    }
    let event_idx = aligned
        .first_on_or_after(spec.event_date)
        .ok_or_else(invalid_date)?;

    let radius = spec.event_window_radius;
    let before_event = event_idx;
    let after_event = aligned.len() - event_idx - 1;

    if after_event < radius {
        return Err(StudyError::insufficient(
            format!("event window after {}", aligned.dates()[event_idx]),
            radius,
            after_event,
        ));
    }

    let required_before = radius.checked_add(spec.estimation_window_length);
    if required_before.is_none_or(|required| before_event < required) {
        return Err(StudyError::insufficient(
            format!(
                "estimation window ({} days) plus {} pre-event days before {}",
                spec.estimation_window_length, radius, aligned.dates()[event_idx]
            ),
            required_before.unwrap_or(usize::MAX),
            before_event,
        ));
    }

    let event_start = event_idx - radius;
    let event_end = event_idx + radius + 1;
    let estimation_start = event_start - spec.estimation_window_length;

    let split = WindowSplit {
        estimation: aligned.slice(estimation_start..event_start),
        event: aligned.slice(event_start..event_end),
        relative_days: (spec.first_relative_day()..=radius as i64).collect(),
        event_trading_date: aligned.dates()[event_idx],
    };

    debug!(
        event_date = %spec.event_date,
        day_zero = %split.event_trading_date,
        estimation = split.estimation.len(),
        event = split.event.len(),
        "split estimation and event windows"
    );

    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align_returns;
    use crate::series::{FactorSeries, PriceSeries};
    use chrono::Duration;
    use rstest::rstest;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    /// `n` consecutive calendar days of prices, giving `n - 1` aligned returns.
    fn aligned(n: usize) -> AlignedReturns {
        let prices = PriceSeries::from_pairs(
            "TEST",
            (0..n).map(|i| (start() + Duration::days(i as i64), 100.0 + (i % 3) as f64)),
        )
        .unwrap();
        let benchmark = FactorSeries::benchmark_from_prices(&prices);
        align_returns(&prices, &benchmark).unwrap()
    }

    #[test]
    fn test_windows_are_disjoint_and_sized() {
        let aligned = aligned(40);
        let event_date = aligned.dates()[20];
        let split = split_windows(&aligned, &EventWindowSpec::new(event_date, 10, 5)).unwrap();

        assert_eq!(split.estimation.len(), 10);
        assert_eq!(split.event.len(), 11);
        assert_eq!(split.event_trading_date, event_date);
        assert_eq!(split.relative_days.first(), Some(&-5));
        assert_eq!(split.relative_days.last(), Some(&5));

        let (est_end, event_start) = split.boundary().unwrap();
        assert!(est_end < event_start);
        assert!(est_end < event_date);
        assert_eq!(split.event.dates()[5], event_date);
    }

    #[test]
    fn test_non_trading_event_date_rolls_forward() {
        // calendar day 21 is missing, as a market holiday would be
        let prices = PriceSeries::from_pairs(
            "TEST",
            (0..40)
                .filter(|&i| i != 21)
                .map(|i| (start() + Duration::days(i), 100.0 + (i % 4) as f64)),
        )
        .unwrap();
        let benchmark = FactorSeries::benchmark_from_prices(&prices);
        let aligned = align_returns(&prices, &benchmark).unwrap();

        let holiday = start() + Duration::days(21);
        let split = split_windows(&aligned, &EventWindowSpec::new(holiday, 5, 2)).unwrap();
        assert_eq!(split.event_trading_date, start() + Duration::days(22));
    }

    #[rstest]
    #[case::day_after_last(true)]
    #[case::before_first(false)]
    fn test_event_outside_data(#[case] after: bool) {
        let aligned = aligned(40);
        let event_date = if after {
            *aligned.dates().last().unwrap() + Duration::days(1)
        } else {
            *aligned.dates().first().unwrap() - Duration::days(5)
        };
        let err = split_windows(&aligned, &EventWindowSpec::new(event_date, 5, 2)).unwrap_err();
        assert!(matches!(err, StudyError::InvalidEventDate { .. }));
    }

    #[rstest]
    #[case::not_enough_estimation(5, 30, 5)]
    #[case::not_enough_post_event(35, 5, 10)]
    #[case::estimation_length_overflows(20, usize::MAX, 5)]
    #[case::radius_overflows(20, 5, usize::MAX)]
    fn test_insufficient_windows(
        #[case] event_idx: usize,
        #[case] estimation: usize,
        #[case] radius: usize,
    ) {
        let aligned = aligned(40);
        let spec = EventWindowSpec::new(aligned.dates()[event_idx], estimation, radius);
        let err = split_windows(&aligned, &spec).unwrap_err();
        assert!(matches!(err, StudyError::InsufficientData { .. }));
    }

    #[test]
    fn test_zero_radius_keeps_day_zero() {
        let aligned = aligned(20);
        let spec = EventWindowSpec::new(aligned.dates()[10], 5, 0);
        let split = split_windows(&aligned, &spec).unwrap();
        assert_eq!(split.relative_days, vec![0]);
        assert_eq!(split.event.len(), 1);
    }
}
