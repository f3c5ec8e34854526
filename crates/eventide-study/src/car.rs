//! CAR Aggregator
//!
//! Running sums, in relative-day order, of abnormal, actual and expected
//! returns. Each cumulative value is the previous one plus the day's return,
//! so `car[d] == car[d - 1] + ar[d]` holds exactly.

use crate::abnormal::AbnormalReturns;
use ndarray::Array1;

/// Cumulative sums over the event window.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeReturns {
    /// Cumulative abnormal return (CAR)
    pub abnormal: Array1<f64>,
    /// Cumulative actual return
    pub stock: Array1<f64>,
    /// Cumulative expected return
    pub expected: Array1<f64>,
}

/// Running sum of `values`; the first element is the first value itself.
pub fn cumulative_sum(values: &Array1<f64>) -> Array1<f64> {
    let mut total = 0.0;
    values
        .iter()
        .map(|v| {
            total += v;
            total
        })
        .collect()
}

/// Cumulate each column of `returns` independently.
pub fn aggregate(returns: &AbnormalReturns) -> CumulativeReturns {
    CumulativeReturns {
        abnormal: cumulative_sum(&returns.abnormal),
        stock: cumulative_sum(&returns.stock),
        expected: cumulative_sum(&returns.expected),
    }
}
