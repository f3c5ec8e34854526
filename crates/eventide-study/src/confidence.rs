//! Confidence Interval Estimator
//!
//! Treats event-window abnormal returns as i.i.d. with the estimation-window
//! residual variance σ². After `d` accumulated days:
//!
//! ```text
//! Var(CAR_d) = d · σ²
//! CI_d       = CAR_d ± z · sqrt(d · σ²)
//! ```
//!
//! where `z` is the two-tailed standard normal critical value for the
//! configured confidence level.

use crate::error::{Result, StudyError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use tracing::warn;

/// Residual variance at or below this is rounding noise from an exact fit.
pub const DEGENERATE_VARIANCE: f64 = 1e-30;

/// Two-sided confidence level strictly between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    /// The conventional 95% level.
    pub const NINETY_FIVE: Self = Self(0.95);

    /// Validate a confidence level.
    pub fn new(level: f64) -> Result<Self> {
        if level.is_finite() && level > 0.0 && level < 1.0 {
            Ok(Self(level))
        } else {
            Err(StudyError::InvalidInput(format!(
                "confidence level must be in (0, 1), got {level}"
            )))
        }
    }

    /// Level as a fraction.
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Two-tailed critical value, `Φ⁻¹(1 - (1 - c) / 2)`.
    pub fn z_score(&self) -> Result<f64> {
        let normal = Normal::new(0.0, 1.0).map_err(|e| StudyError::InvalidInput(e.to_string()))?;
        Ok(normal.inverse_cdf(1.0 - (1.0 - self.0) / 2.0))
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self::NINETY_FIVE
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = StudyError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0 * 100.0)
    }
}

/// Whether the band carries statistical information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reliability {
    /// Band derived from a positive residual variance
    Reliable,
    /// Residual variance is zero; the band collapses to the point estimate
    /// and must not be read as exact
    DegenerateVariance,
}

impl Reliability {
    /// Whether the band can be interpreted statistically.
    pub const fn is_reliable(&self) -> bool {
        matches!(self, Self::Reliable)
    }
}

/// Per-day confidence band around the CAR path.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBand {
    /// Lower bound per day
    pub lower: Array1<f64>,
    /// Upper bound per day
    pub upper: Array1<f64>,
    /// `z · sqrt(d · σ²)` per day
    pub half_width: Array1<f64>,
    /// Critical value used
    pub z: f64,
    /// Whether the band is statistically meaningful
    pub reliability: Reliability,
}

/// Build the band around `car` from the estimation residual variance.
pub fn confidence_band(
    car: &Array1<f64>,
    residual_variance: f64,
    level: ConfidenceLevel,
) -> Result<ConfidenceBand> {
    if !residual_variance.is_finite() || residual_variance < 0.0 {
        return Err(StudyError::InvalidInput(format!(
            "residual variance must be a non-negative number, got {residual_variance}"
        )));
    }

    let z = level.z_score()?;
    let reliability = if residual_variance <= DEGENERATE_VARIANCE {
        warn!(
            residual_variance,
            "zero residual variance in estimation window, confidence band is degenerate"
        );
        Reliability::DegenerateVariance
    } else {
        Reliability::Reliable
    };

    let half_width: Array1<f64> = (1..=car.len())
        .map(|d| match reliability {
            Reliability::Reliable => z * (d as f64 * residual_variance).sqrt(),
            Reliability::DegenerateVariance => 0.0,
        })
        .collect();

    Ok(ConfidenceBand {
        lower: car - &half_width,
        upper: car + &half_width,
        half_width,
        z,
        reliability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.90, 1.644_853_6)]
    #[case(0.95, 1.959_964_0)]
    #[case(0.99, 2.575_829_3)]
    fn test_z_scores(#[case] level: f64, #[case] expected: f64) {
        let z = ConfidenceLevel::new(level).unwrap().z_score().unwrap();
        assert_abs_diff_eq!(z, expected, epsilon = 1e-6);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    fn test_rejects_bad_levels(#[case] level: f64) {
        assert!(ConfidenceLevel::new(level).is_err());
    }

    #[test]
    fn test_band_grows_with_sqrt_days() {
        let car = Array1::from_vec(vec![0.01, 0.012, 0.05, 0.049, 0.051]);
        let sigma2 = 0.0004;
        let band = confidence_band(&car, sigma2, ConfidenceLevel::default()).unwrap();

        assert_eq!(band.reliability, Reliability::Reliable);
        for d in 1..car.len() {
            assert!(band.half_width[d] >= band.half_width[d - 1]);
        }
        assert_abs_diff_eq!(band.half_width[0], band.z * 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(
            band.half_width[3],
            band.z * (4.0_f64 * sigma2).sqrt(),
            epsilon = 1e-12
        );
        for d in 0..car.len() {
            assert_abs_diff_eq!(band.upper[d] - car[d], car[d] - band.lower[d], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_zero_variance_is_flagged() {
        let car = Array1::from_vec(vec![0.0, 0.05, 0.05]);
        let band = confidence_band(&car, 0.0, ConfidenceLevel::default()).unwrap();

        assert_eq!(band.reliability, Reliability::DegenerateVariance);
        assert!(!band.reliability.is_reliable());
        assert_eq!(band.lower, car);
        assert_eq!(band.upper, car);
    }

    #[test]
    fn test_negative_variance_rejected() {
        let car = Array1::from_vec(vec![0.0]);
        assert!(confidence_band(&car, -1.0, ConfidenceLevel::default()).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let level: ConfidenceLevel = serde_json::from_str("0.9").unwrap();
        assert_abs_diff_eq!(level.value(), 0.9);
        assert!(serde_json::from_str::<ConfidenceLevel>("1.5").is_err());
    }
}
